//! # Anotações
//!
//! Uma [`Tag`] é um span rotulado. O rótulo pode ser hierárquico, com níveis
//! separados por ponto (`"PER.first"` → `["PER", "first"]`).
//!
//! Um [`AnnotationSet`] agrupa tags de mesmo nome. Como as segmentações, ele
//! pode estar em offsets absolutos ou relativo a uma segmentação (tipicamente
//! `"tokens"`), e é resolvido pelo mesmo mecanismo de cadeia de referência.
//!
//! Tags têm semântica de valor: realinhar um conjunto produz um conjunto novo.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::Result;
use crate::segmentation::{project_one, resolve_chain};
use crate::span::{overflow_message, Span};

/// Span rotulado.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TagRecord", into = "TagRecord")]
pub struct Tag {
    pub value: String,
    pub span: Span,
}

/// Forma persistida de uma tag: `{value, start, length}`.
#[derive(Serialize, Deserialize)]
struct TagRecord {
    value: String,
    start: usize,
    length: usize,
}

impl TryFrom<TagRecord> for Tag {
    type Error = String;

    fn try_from(record: TagRecord) -> std::result::Result<Self, Self::Error> {
        let span = Span::checked_with_length(record.start, record.length)
            .ok_or_else(|| overflow_message(record.start, record.length))?;
        Ok(Tag::new(record.value, span))
    }
}

impl From<Tag> for TagRecord {
    fn from(tag: Tag) -> Self {
        TagRecord {
            start: tag.span.lb(),
            length: tag.span.len(),
            value: tag.value,
        }
    }
}

impl Tag {
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            span,
        }
    }

    pub fn lb(&self) -> usize {
        self.span.lb()
    }

    pub fn ub(&self) -> usize {
        self.span.ub()
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// Níveis do rótulo hierárquico.
    pub fn levels(&self) -> Vec<&str> {
        self.value.split('.').collect()
    }

    pub fn with_span(&self, span: Span) -> Self {
        Self::new(self.value.clone(), span)
    }

    pub fn shifted(&self, n: usize) -> Self {
        self.with_span(self.span.shifted(n))
    }

    /// Chave de ordenação `(lb, -ub, value)`.
    fn sort_key(&self) -> (usize, Reverse<usize>, &str) {
        (self.lb(), Reverse(self.ub()), self.value.as_str())
    }
}

/// Conjunto nomeado de tags, opcionalmente relativo a uma segmentação.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationSet {
    pub name: String,
    pub reference: Option<String>,
    pub annotations: Vec<Tag>,
}

impl AnnotationSet {
    pub fn new(name: impl Into<String>, reference: Option<&str>) -> Self {
        Self {
            name: name.into(),
            reference: reference.map(str::to_string),
            annotations: Vec::new(),
        }
    }

    pub fn from_tags(name: impl Into<String>, reference: Option<&str>, tags: Vec<Tag>) -> Self {
        let mut set = Self::new(name, reference);
        for tag in tags {
            set.add(tag);
        }
        set
    }

    /// Adiciona uma tag; retorna `false` se `(lb, ub, value)` já existe.
    pub fn add(&mut self, tag: Tag) -> bool {
        if self.annotations.contains(&tag) {
            return false;
        }
        self.annotations.push(tag);
        true
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.annotations.iter()
    }

    /// Ordena por `(lb, -ub, value)`.
    pub fn normalize(&mut self) {
        sort_annotations(&mut self.annotations);
    }

    /// Tags em offsets absolutos, na mesma ordem do conjunto.
    pub fn get_reference_annotations(&self, document: &Document) -> Result<Vec<Tag>> {
        let reference = match &self.reference {
            None => return Ok(self.annotations.clone()),
            Some(reference) => reference,
        };
        let parent = resolve_chain(document, reference, None)?;
        self.annotations
            .iter()
            .map(|tag| Ok(tag.with_span(project_one(&tag.span, &parent, reference)?)))
            .collect()
    }

    /// Realinha um conjunto em offsets de caractere para índices de `reference`.
    ///
    /// Cada tag passa a cobrir os tokens que intersectam seu span; tags que não
    /// tocam nenhum token são descartadas. O conjunto original não é alterado.
    pub fn to_reference(&self, reference_spans: &[Span], reference: &str) -> AnnotationSet {
        let mut aligned = AnnotationSet::new(self.name.clone(), Some(reference));
        for tag in &self.annotations {
            let first = reference_spans.partition_point(|s| s.ub() <= tag.lb());
            let last = reference_spans.partition_point(|s| s.lb() < tag.ub());
            if first < last {
                aligned.add(tag.with_span(Span::new(first, last)));
            }
        }
        aligned.normalize();
        aligned
    }
}

pub fn sort_annotations(tags: &mut [Tag]) {
    tags.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Mantém apenas as tags maximais (não aninhadas nem sobrepostas à anterior).
///
/// A entrada deve estar ordenada por `(lb, -ub)`. Uma tag que começa antes do
/// fim da última tag mantida é descartada.
pub fn get_top_level(tags: &[Tag]) -> Vec<Tag> {
    let mut kept: Vec<Tag> = Vec::with_capacity(tags.len());
    for tag in tags {
        match kept.last() {
            Some(last) if tag.lb() < last.ub() => {}
            _ => kept.push(tag.clone()),
        }
    }
    kept
}

/// Dual de [`get_top_level`]: mantém as tags mais internas.
///
/// Uma tag que contém outra é descartada em favor da interna; entre tags que se
/// cruzam sem aninhamento, fica a que termina primeiro.
pub fn get_bottom_level(tags: &[Tag]) -> Vec<Tag> {
    let mut stack: Vec<Tag> = Vec::with_capacity(tags.len());
    for tag in tags {
        // `tag` dentro de `top`: a interna vence
        while stack.last().is_some_and(|top| tag.lb() < top.ub() && tag.ub() <= top.ub()) {
            stack.pop();
        }
        match stack.last() {
            Some(top) if tag.lb() < top.ub() => {}
            _ => stack.push(tag.clone()),
        }
    }
    stack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SemError;
    use crate::segmentation::Segmentation;

    fn tag(value: &str, lb: usize, ub: usize) -> Tag {
        Tag::new(value, Span::new(lb, ub))
    }

    #[test]
    fn test_levels() {
        assert_eq!(tag("PER.first", 0, 1).levels(), vec!["PER", "first"]);
        assert_eq!(tag("LOC", 0, 1).levels(), vec!["LOC"]);
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut set = AnnotationSet::new("NER", None);
        assert!(set.add(tag("PER", 0, 4)));
        assert!(!set.add(tag("PER", 0, 4)));
        assert!(set.add(tag("ORG", 0, 4)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_normalize_order() {
        let mut set = AnnotationSet::from_tags(
            "NER",
            None,
            vec![tag("LOC", 5, 6), tag("PER", 0, 2), tag("ORG", 0, 4), tag("MISC", 0, 4)],
        );
        set.normalize();
        let order: Vec<&str> = set.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(order, vec!["MISC", "ORG", "PER", "LOC"]);
    }

    #[test]
    fn test_persisted_form() {
        let json = serde_json::to_string(&tag("PER", 3, 7)).unwrap();
        assert_eq!(json, r#"{"value":"PER","start":3,"length":4}"#);
        let back: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag("PER", 3, 7));
    }

    #[test]
    fn test_top_level_keeps_outermost() {
        let mut tags = vec![tag("A", 0, 5), tag("B", 1, 3), tag("C", 4, 7), tag("D", 7, 8)];
        sort_annotations(&mut tags);
        let top = get_top_level(&tags);
        assert_eq!(top, vec![tag("A", 0, 5), tag("D", 7, 8)]);
    }

    #[test]
    fn test_bottom_level_keeps_innermost() {
        let mut tags = vec![tag("A", 0, 5), tag("B", 1, 3), tag("C", 7, 9), tag("D", 7, 8)];
        sort_annotations(&mut tags);
        let bottom = get_bottom_level(&tags);
        assert_eq!(bottom, vec![tag("B", 1, 3), tag("D", 7, 8)]);
    }

    #[test]
    fn test_to_reference_returns_new_set() {
        let tokens = vec![Span::new(0, 4), Span::new(5, 11), Span::new(12, 18), Span::new(19, 20)];
        let mut chars = AnnotationSet::new("NER", None);
        chars.add(tag("PER", 0, 11));
        chars.add(tag("LOC", 13, 15));
        chars.add(tag("NONE", 4, 5));

        let tokens_set = chars.to_reference(&tokens, "tokens");
        assert_eq!(tokens_set.reference.as_deref(), Some("tokens"));
        assert_eq!(tokens_set.annotations, vec![tag("PER", 0, 2), tag("LOC", 2, 3)]);
        assert_eq!(chars.annotations[0], tag("PER", 0, 11));
    }

    #[test]
    fn test_reference_annotations_out_of_range() {
        let mut doc = Document::new("d", "ab cd");
        doc.add_segmentation(Segmentation::new("tokens", None, vec![Span::new(0, 2), Span::new(3, 5)]));
        let set = AnnotationSet::from_tags("NER", Some("tokens"), vec![tag("PER", 1, 3)]);

        let err = set.get_reference_annotations(&doc).unwrap_err();
        assert!(matches!(err, SemError::IndexOutOfRange { len: 2, ref reference, .. } if reference == "tokens"));
    }

    #[test]
    fn test_filters_on_empty_input() {
        assert!(get_top_level(&[]).is_empty());
        assert!(get_bottom_level(&[]).is_empty());
    }
}
