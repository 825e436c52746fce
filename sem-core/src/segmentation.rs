//! # Segmentações e Cadeias de Referência
//!
//! Uma [`Segmentation`] é uma sequência nomeada de spans. Quando ela tem uma
//! `reference`, seus spans estão nas **unidades da referência**: a segmentação
//! `"sentences"` guarda intervalos de índices de token, e não offsets de byte.
//!
//! ## Resolução
//!
//! Para chegar aos offsets absolutos, a cadeia é percorrida até a raiz (a
//! segmentação sem referência) e composta de volta:
//!
//! ```text
//! paragraphs [0,2)  →  sentences [0,5) [5,8)  →  tokens [0,3) ... [34,35)
//!                    ⇒ parágrafo absoluto [0, 35)
//! ```
//!
//! Um span local `e` vira `Span(parent[e.lb].lb, parent[e.ub - 1].ub)`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{Result, SemError};
use crate::span::Span;

/// Sequência nomeada de spans, opcionalmente relativa a outra segmentação.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    pub name: String,
    /// Nome da segmentação em cujas unidades os spans estão expressos.
    pub reference: Option<String>,
    pub spans: Vec<Span>,
}

impl Segmentation {
    pub fn new(name: impl Into<String>, reference: Option<&str>, spans: Vec<Span>) -> Self {
        Self {
            name: name.into(),
            reference: reference.map(str::to_string),
            spans,
        }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// `spans[i].ub <= spans[i+1].lb` para todo `i`.
    pub fn is_monotonic(&self) -> bool {
        self.spans.windows(2).all(|w| w[0].ub() <= w[1].lb())
    }

    /// Spans em offsets absolutos, resolvendo a cadeia de referência dentro de `document`.
    pub fn get_reference_spans(&self, document: &Document) -> Result<Vec<Span>> {
        match &self.reference {
            None => Ok(self.spans.clone()),
            Some(reference) => {
                let parent = resolve_chain(document, reference, Some(&self.name))?;
                project(&self.spans, &parent, reference)
            }
        }
    }
}

/// Resolve a segmentação `name` (e tudo abaixo dela) para offsets absolutos.
///
/// A cadeia é coletada iterativamente; um nome repetido é um ciclo.
pub(crate) fn resolve_chain(document: &Document, name: &str, origin: Option<&str>) -> Result<Vec<Span>> {
    let mut visited: HashSet<&str> = origin.into_iter().collect();
    let mut chain: Vec<&Segmentation> = Vec::new();
    let mut current = name;
    loop {
        if !visited.insert(current) {
            return Err(SemError::ReferenceCycle(current.to_string()));
        }
        let segmentation = document
            .segmentation(current)
            .ok_or_else(|| SemError::UnknownSegmentation(current.to_string()))?;
        chain.push(segmentation);
        match &segmentation.reference {
            Some(next) => current = next,
            None => break,
        }
    }

    let mut resolved: Vec<Span> = Vec::new();
    let mut parent_name: Option<&str> = None;
    for segmentation in chain.iter().rev() {
        resolved = match parent_name {
            None => segmentation.spans.clone(),
            Some(parent) => project(&segmentation.spans, &resolved, parent)?,
        };
        parent_name = Some(&segmentation.name);
    }
    Ok(resolved)
}

/// Compõe spans locais sobre os spans (já absolutos) da referência.
pub(crate) fn project(local: &[Span], parent: &[Span], reference: &str) -> Result<Vec<Span>> {
    local
        .iter()
        .map(|span| project_one(span, parent, reference))
        .collect()
}

pub(crate) fn project_one(span: &Span, parent: &[Span], reference: &str) -> Result<Span> {
    let out_of_range = || SemError::IndexOutOfRange {
        span: *span,
        reference: reference.to_string(),
        len: parent.len(),
    };

    if span.is_empty() {
        // ponto entre unidades: início da unidade seguinte, ou fim da última
        return match parent.get(span.lb()) {
            Some(next) => Ok(Span::point(next.lb())),
            None if span.lb() == parent.len() => {
                Ok(Span::point(parent.last().map(Span::ub).unwrap_or(0)))
            }
            None => Err(out_of_range()),
        };
    }

    let first = parent.get(span.lb()).ok_or_else(out_of_range)?;
    let last = parent.get(span.ub() - 1).ok_or_else(out_of_range)?;
    Ok(Span::new(first.lb(), last.ub()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;
    use crate::tokenizer::RuleTokenizer;
    use proptest::prelude::*;

    fn document() -> Document {
        let tokenizer = RuleTokenizer::for_language(Language::French).unwrap();
        Document::segment("doc", "Dr. Dupont est parti. Il reviendra.\n\nFin.", &tokenizer)
    }

    #[test]
    fn test_absolute_segmentation_is_unchanged() {
        let doc = document();
        let tokens = doc.segmentation("tokens").unwrap();
        assert_eq!(tokens.get_reference_spans(&doc).unwrap(), tokens.spans);
    }

    #[test]
    fn test_sentences_resolve_to_characters() {
        let doc = document();
        let sentences = doc.segmentation("sentences").unwrap();
        let spans = sentences.get_reference_spans(&doc).unwrap();
        let texts: Vec<&str> = spans.iter().map(|s| &doc.content[s.lb()..s.ub()]).collect();
        assert_eq!(texts, vec!["Dr. Dupont est parti.", "Il reviendra.", "Fin."]);
    }

    #[test]
    fn test_depth_three_chain() {
        let doc = document();
        let paragraphs = doc.segmentation("paragraphs").unwrap();
        assert_eq!(paragraphs.reference.as_deref(), Some("sentences"));
        let spans = paragraphs.get_reference_spans(&doc).unwrap();
        let texts: Vec<&str> = spans.iter().map(|s| &doc.content[s.lb()..s.ub()]).collect();
        assert_eq!(texts, vec!["Dr. Dupont est parti. Il reviendra.", "Fin."]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let doc = document();
        let paragraphs = doc.segmentation("paragraphs").unwrap();
        let first = paragraphs.get_reference_spans(&doc).unwrap();
        let second = paragraphs.get_reference_spans(&doc).unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.segmentation("paragraphs").unwrap(), paragraphs);
    }

    #[test]
    fn test_unknown_reference() {
        let mut doc = Document::new("doc", "abc");
        doc.add_segmentation(Segmentation::new("chunks", Some("tokens"), vec![Span::new(0, 1)]));
        let err = doc.absolute_spans("chunks").unwrap_err();
        assert!(matches!(err, SemError::UnknownSegmentation(name) if name == "tokens"));
    }

    #[test]
    fn test_reference_cycle() {
        let mut doc = Document::new("doc", "abc");
        doc.add_segmentation(Segmentation::new("a", Some("b"), vec![]));
        doc.add_segmentation(Segmentation::new("b", Some("a"), vec![]));
        assert!(matches!(doc.absolute_spans("a"), Err(SemError::ReferenceCycle(_))));

        doc.add_segmentation(Segmentation::new("self", Some("self"), vec![]));
        assert!(matches!(doc.absolute_spans("self"), Err(SemError::ReferenceCycle(_))));
    }

    #[test]
    fn test_out_of_range_index() {
        let mut doc = Document::new("doc", "ab cd");
        doc.add_segmentation(Segmentation::new("tokens", None, vec![Span::new(0, 2), Span::new(3, 5)]));
        doc.add_segmentation(Segmentation::new("sentences", Some("tokens"), vec![Span::new(0, 3)]));
        let err = doc.absolute_spans("sentences").unwrap_err();
        assert!(matches!(err, SemError::IndexOutOfRange { len: 2, .. }));
    }

    #[test]
    fn test_empty_local_span_maps_to_point() {
        let parent = vec![Span::new(0, 2), Span::new(3, 5)];
        assert_eq!(project_one(&Span::point(1), &parent, "t").unwrap(), Span::point(3));
        assert_eq!(project_one(&Span::point(2), &parent, "t").unwrap(), Span::point(5));
        assert!(project_one(&Span::point(3), &parent, "t").is_err());
    }

    proptest! {
        #[test]
        fn resolved_chain_is_monotonic(text in "[a-z .?!\n]{0,80}") {
            let tokenizer = RuleTokenizer::for_language(Language::French).unwrap();
            let doc = Document::segment("p", &text, &tokenizer);
            for name in ["tokens", "sentences", "paragraphs"] {
                let segmentation = doc.segmentation(name).unwrap();
                prop_assert!(segmentation.is_monotonic());
                let first = doc.absolute_spans(name).unwrap();
                let second = doc.absolute_spans(name).unwrap();
                prop_assert!(first.windows(2).all(|w| w[0].ub() <= w[1].lb()));
                prop_assert_eq!(first, second);
            }
        }
    }
}
