//! # Pipeline de Anotação: Orquestrador com Eventos Observáveis
//!
//! Encadeia os módulos do crate:
//!
//! 1. Segmentação do texto em tokens, sentenças e parágrafos ([`Document::segment`]).
//! 2. Matriz de features por sentença ([`extract_features`]).
//! 3. Rotulação de todas as sentenças ([`SequenceLabeler`]).
//! 4. Decodificação das colunas de tags em chunks ([`chunks_to_annotation`]),
//!    deslocados pelo início de cada sentença.
//! 5. Conjunto de anotações relativo a `tokens`, resolvido para offsets de
//!    caractere na saída.
//!
//! Cada passo emite um [`PipelineEvent`] por um canal (`mpsc`), permitindo que
//! o servidor WebSocket transmita o progresso em tempo real.

use std::sync::{mpsc, Arc};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::annotation::AnnotationSet;
use crate::document::{Document, PARAGRAPHS, SENTENCES, TOKENS};
use crate::error::{Result, SemError};
use crate::features::{default_templates, extract_features, FeatureTemplate};
use crate::labeler::{SentenceMatrix, SequenceLabeler};
use crate::span::Span;
use crate::tagger::{chunks_to_annotation, SchemeFlags};
use crate::tokenizer::Tokenizer;

/// Nome padrão do conjunto de anotações produzido.
pub const DEFAULT_ANNOTATION_NAME: &str = "NER";

/// Anotação resolvida, pronta para exibição.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedSpan {
    pub value: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Eventos emitidos pelo pipeline durante o processamento.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: texto segmentado.
    SegmentationDone {
        tokens: usize,
        sentences: usize,
        paragraphs: usize,
    },
    /// **Passo 2**: matriz de features de uma sentença.
    FeaturesComputed {
        sentence_index: usize,
        tokens: usize,
        columns: Vec<String>,
    },
    /// **Passo 3**: o rotulador devolveu as colunas de tags.
    Labeled { labeler: String, sentences: usize },
    /// **Conclusão**: anotações em offsets de caractere.
    Done {
        annotations: Vec<AnnotatedSpan>,
        total_tokens: usize,
        processing_ms: u64,
    },
    /// **Falha**: erro irrecuperável; nenhum `Done` é emitido.
    Error { message: String },
}

/// O pipeline de anotação.
///
/// Imutável depois de construído e compartilhável entre threads: o mesmo
/// valor atende [`analyze_batch`](Self::analyze_batch) em paralelo.
pub struct AnnotationPipeline {
    tokenizer: Arc<dyn Tokenizer>,
    templates: Vec<FeatureTemplate>,
    labeler: Arc<dyn SequenceLabeler>,
    scheme: SchemeFlags,
    strict: bool,
    annotation_name: String,
}

impl AnnotationPipeline {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, labeler: Arc<dyn SequenceLabeler>) -> Self {
        Self {
            tokenizer,
            templates: default_templates(),
            labeler,
            scheme: SchemeFlags::bio(),
            strict: false,
            annotation_name: DEFAULT_ANNOTATION_NAME.to_string(),
        }
    }

    pub fn with_templates(mut self, templates: Vec<FeatureTemplate>) -> Self {
        self.templates = templates;
        self
    }

    /// Esquema em que o rotulador escreve suas tags.
    pub fn with_scheme(mut self, scheme: SchemeFlags) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_annotation_name(mut self, name: impl Into<String>) -> Self {
        self.annotation_name = name.into();
        self
    }

    pub fn annotation_name(&self) -> &str {
        &self.annotation_name
    }

    /// Processa o texto de forma síncrona.
    pub fn analyze(&self, name: &str, text: &str) -> Result<Document> {
        self.run(name, text, &mut |_| {})
    }

    /// Executa o pipeline enviando eventos de progresso pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `SegmentationDone`
    /// 2. `FeaturesComputed` (uma vez por sentença)
    /// 3. `Labeled`
    /// 4. `Done`, ou `Error` se algum passo falhar
    pub fn analyze_streaming(&self, name: &str, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let result = self.run(name, text, &mut |event| {
            let _ = tx.send(event);
        });
        if let Err(err) = result {
            let _ = tx.send(PipelineEvent::Error {
                message: err.to_string(),
            });
        }
    }

    /// Processa vários documentos `(nome, texto)` em paralelo, preservando a ordem.
    pub fn analyze_batch(&self, inputs: &[(String, String)]) -> Vec<Result<Document>> {
        inputs
            .par_iter()
            .map(|(name, text)| self.analyze(name, text))
            .collect()
    }

    /// Anotações do documento em offsets de caractere, com o texto coberto.
    pub fn resolved_annotations(&self, document: &Document) -> Result<Vec<AnnotatedSpan>> {
        Ok(document
            .reference_annotations(&self.annotation_name)?
            .into_iter()
            .map(|tag| AnnotatedSpan {
                text: document.text(&tag.span).to_string(),
                start: tag.lb(),
                end: tag.ub(),
                value: tag.value,
            })
            .collect())
    }

    fn run(&self, name: &str, text: &str, emit: &mut dyn FnMut(PipelineEvent)) -> Result<Document> {
        let start = Instant::now();

        // === Passo 1: Segmentação ===
        let mut document = Document::segment(name, text, self.tokenizer.as_ref());
        let tokens = segmentation_spans(&document, TOKENS)?;
        let sentences = segmentation_spans(&document, SENTENCES)?;
        emit(PipelineEvent::SegmentationDone {
            tokens: tokens.len(),
            sentences: sentences.len(),
            paragraphs: document.segmentation(PARAGRAPHS).map(|s| s.len()).unwrap_or(0),
        });

        // === Passo 2: Features ===
        let columns: Vec<String> = self.templates.iter().map(FeatureTemplate::name).collect();
        let mut matrices: Vec<SentenceMatrix> = Vec::with_capacity(sentences.len());
        for (sentence_index, sentence) in sentences.iter().enumerate() {
            let words: Vec<&str> = tokens[sentence.lb()..sentence.ub()]
                .iter()
                .map(|span| document.text(span))
                .collect();
            matrices.push(extract_features(&words, &self.templates));
            emit(PipelineEvent::FeaturesComputed {
                sentence_index,
                tokens: words.len(),
                columns: columns.clone(),
            });
        }

        // === Passo 3: Rotulação ===
        let labeled = self.labeler.label(&matrices)?;
        if labeled.len() != sentences.len() {
            return Err(SemError::Labeler(format!(
                "{} returned {} columns for {} sentences",
                self.labeler.name(),
                labeled.len(),
                sentences.len()
            )));
        }
        emit(PipelineEvent::Labeled {
            labeler: self.labeler.name().to_string(),
            sentences: labeled.len(),
        });

        // === Passo 4: Decodificação ===
        let mut set = AnnotationSet::new(self.annotation_name.clone(), Some(TOKENS));
        for (index, (sentence, column)) in sentences.iter().zip(&labeled).enumerate() {
            if column.len() != sentence.len() {
                return Err(SemError::LabelerOutput {
                    sentence: index,
                    expected: sentence.len(),
                    found: column.len(),
                });
            }
            for tag in chunks_to_annotation(column, sentence.lb(), &self.scheme, self.strict)? {
                set.add(tag);
            }
        }
        set.normalize();
        debug!(document = name, annotations = set.len(), "annotation set built");
        document.add_annotation_set(set);

        let annotations = self.resolved_annotations(&document)?;
        emit(PipelineEvent::Done {
            annotations,
            total_tokens: tokens.len(),
            processing_ms: start.elapsed().as_millis() as u64,
        });
        Ok(document)
    }
}

fn segmentation_spans(document: &Document, name: &str) -> Result<Vec<Span>> {
    document
        .segmentation(name)
        .map(|s| s.spans.clone())
        .ok_or_else(|| SemError::UnknownSegmentation(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;
    use crate::rule_based::DictionaryLabeler;
    use crate::tagger::Scheme;
    use crate::tokenizer::RuleTokenizer;
    use crate::trie::{Cleaner, Splitter, Trie};

    fn french() -> Arc<dyn Tokenizer> {
        Arc::new(RuleTokenizer::for_language(Language::French).unwrap())
    }

    fn dictionary_pipeline(scheme: Scheme) -> AnnotationPipeline {
        let per = Trie::compile(["Marie Curie"], Cleaner::Strip, Splitter::Whitespace);
        let loc = Trie::compile(["Varsovie", "Paris"], Cleaner::Strip, Splitter::Whitespace);
        let labeler = DictionaryLabeler::new(scheme.flags())
            .with_dictionary("PER", per)
            .with_dictionary("LOC", loc);
        AnnotationPipeline::new(french(), Arc::new(labeler)).with_scheme(scheme.flags())
    }

    /// Devolve sempre as mesmas colunas, para testar o tratamento da saída.
    struct FixedLabeler(Vec<Vec<String>>);

    impl SequenceLabeler for FixedLabeler {
        fn name(&self) -> &str {
            "fixed"
        }

        fn label(&self, _sentences: &[SentenceMatrix]) -> Result<Vec<Vec<String>>> {
            Ok(self.0.clone())
        }
    }

    struct FailingLabeler;

    impl SequenceLabeler for FailingLabeler {
        fn name(&self) -> &str {
            "failing"
        }

        fn label(&self, _sentences: &[SentenceMatrix]) -> Result<Vec<Vec<String>>> {
            Err(SemError::Labeler("exit status 1".to_string()))
        }
    }

    fn column(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_pipeline_basic() {
        let pipeline = dictionary_pipeline(Scheme::Bioes);
        let doc = pipeline
            .analyze("d", "Marie Curie est née à Varsovie. Elle a vécu à Paris.")
            .unwrap();
        let spans = pipeline.resolved_annotations(&doc).unwrap();
        let found: Vec<(&str, &str)> = spans.iter().map(|a| (a.value.as_str(), a.text.as_str())).collect();
        assert_eq!(found, vec![("PER", "Marie Curie"), ("LOC", "Varsovie"), ("LOC", "Paris")]);

        // o conjunto fica em índices de token
        let set = doc.annotation_set(DEFAULT_ANNOTATION_NAME).unwrap();
        assert_eq!(set.reference.as_deref(), Some(TOKENS));
        assert_eq!(set.annotations[0].span, Span::new(0, 2));
        assert_eq!(set.annotations[2].span, Span::new(11, 12));
    }

    #[test]
    fn test_pipeline_empty() {
        let pipeline = dictionary_pipeline(Scheme::Bio);
        let doc = pipeline.analyze("vide", "").unwrap();
        assert!(pipeline.resolved_annotations(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_pipeline_events_streaming() {
        let pipeline = dictionary_pipeline(Scheme::Bio);
        let (tx, rx) = mpsc::channel();
        pipeline.analyze_streaming("d", "Marie Curie est née. Paris.", tx);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(matches!(&events[0], PipelineEvent::SegmentationDone { sentences: 2, .. }));
        let features = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::FeaturesComputed { .. }))
            .count();
        assert_eq!(features, 2);
        match events.last() {
            Some(PipelineEvent::Done { annotations, .. }) => assert_eq!(annotations.len(), 2),
            other => panic!("Último evento deve ser Done, veio {other:?}"),
        }
    }

    #[test]
    fn test_event_serialization() {
        let event = PipelineEvent::Labeled {
            labeler: "dictionary".to_string(),
            sentences: 3,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"Labeled","data":{"labeler":"dictionary","sentences":3}}"#);
    }

    #[test]
    fn test_wrong_column_length() {
        let labeler = FixedLabeler(vec![column(&["O"])]);
        let pipeline = AnnotationPipeline::new(french(), Arc::new(labeler));
        let err = pipeline.analyze("d", "Deux mots.").unwrap_err();
        assert!(matches!(err, SemError::LabelerOutput { sentence: 0, expected: 3, found: 1 }));
    }

    #[test]
    fn test_wrong_sentence_count() {
        let labeler = FixedLabeler(vec![]);
        let pipeline = AnnotationPipeline::new(french(), Arc::new(labeler));
        assert!(matches!(pipeline.analyze("d", "Un. Deux."), Err(SemError::Labeler(_))));
    }

    #[test]
    fn test_strict_mode_propagates() {
        let tags = column(&["B-PER", "I-LOC", "O"]);
        let strict = AnnotationPipeline::new(french(), Arc::new(FixedLabeler(vec![tags.clone()]))).strict(true);
        assert!(matches!(strict.analyze("d", "Jean Paris ."), Err(SemError::SchemeConsistency { .. })));

        let lenient = AnnotationPipeline::new(french(), Arc::new(FixedLabeler(vec![tags])));
        let doc = lenient.analyze("d", "Jean Paris .").unwrap();
        let spans = lenient.resolved_annotations(&doc).unwrap();
        assert_eq!(spans[0].value, "LOC");
        assert_eq!(spans[0].text, "Jean Paris");
    }

    #[test]
    fn test_labeler_failure_is_streamed() {
        let pipeline = AnnotationPipeline::new(french(), Arc::new(FailingLabeler));
        let (tx, rx) = mpsc::channel();
        pipeline.analyze_streaming("d", "Texte.", tx);
        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(matches!(events.last(), Some(PipelineEvent::Error { message }) if message.contains("exit status 1")));
        assert!(!events.iter().any(|e| matches!(e, PipelineEvent::Done { .. })));
    }

    #[test]
    fn test_batch_preserves_order() {
        let pipeline = dictionary_pipeline(Scheme::Bio);
        let inputs: Vec<(String, String)> = (0..8)
            .map(|i| (format!("doc{i}"), if i % 2 == 0 { "Paris.".to_string() } else { "Rien.".to_string() }))
            .collect();
        let docs = pipeline.analyze_batch(&inputs);
        assert_eq!(docs.len(), 8);
        for (i, doc) in docs.into_iter().enumerate() {
            let doc = doc.unwrap();
            assert_eq!(doc.name, format!("doc{i}"));
            let expected = if i % 2 == 0 { 1 } else { 0 };
            assert_eq!(pipeline.resolved_annotations(&doc).unwrap().len(), expected);
        }
    }
}
