//! # Documento
//!
//! Contêiner que possui o texto e tudo o que foi construído sobre ele:
//! segmentações e conjuntos de anotações, ambos indexados por nome.
//!
//! ```text
//! Document "exemplo"
//! ├── content: "Dr. Dupont est parti. Il reviendra."
//! ├── segmentations
//! │   ├── tokens      (absoluto, offsets de byte)
//! │   ├── sentences   (→ tokens)
//! │   └── paragraphs  (→ sentences)
//! └── annotations
//!     └── NER         (→ tokens)
//! ```
//!
//! A serialização JSON segue a forma persistida: cada span vira `{start, length}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::annotation::{AnnotationSet, Tag};
use crate::error::{Result, SemError};
use crate::segmentation::{resolve_chain, Segmentation};
use crate::span::Span;
use crate::tokenizer::Tokenizer;

pub const TOKENS: &str = "tokens";
pub const SENTENCES: &str = "sentences";
pub const PARAGRAPHS: &str = "paragraphs";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub segmentations: BTreeMap<String, Segmentation>,
    #[serde(default)]
    pub annotations: BTreeMap<String, AnnotationSet>,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            segmentations: BTreeMap::new(),
            annotations: BTreeMap::new(),
        }
    }

    /// Cria o documento e constrói a cadeia `tokens` → `sentences` → `paragraphs`.
    ///
    /// Nunca falha: a tokenização sempre produz um resultado, mesmo para texto vazio.
    pub fn segment(name: impl Into<String>, content: impl Into<String>, tokenizer: &dyn Tokenizer) -> Self {
        let mut document = Self::new(name, content);
        let tokens = tokenizer.word_spans(&document.content);
        let sentences = tokenizer.sentence_spans(&document.content, &tokens);
        let paragraphs = tokenizer.paragraph_spans(&document.content, &sentences, &tokens);
        debug!(
            document = %document.name,
            tokens = tokens.len(),
            sentences = sentences.len(),
            paragraphs = paragraphs.len(),
            "document segmented"
        );

        document.add_segmentation(Segmentation::new(TOKENS, None, tokens));
        document.add_segmentation(Segmentation::new(SENTENCES, Some(TOKENS), sentences));
        document.add_segmentation(Segmentation::new(PARAGRAPHS, Some(SENTENCES), paragraphs));
        document
    }

    /// Adiciona (ou substitui) uma segmentação.
    pub fn add_segmentation(&mut self, segmentation: Segmentation) {
        self.segmentations.insert(segmentation.name.clone(), segmentation);
    }

    pub fn segmentation(&self, name: &str) -> Option<&Segmentation> {
        self.segmentations.get(name)
    }

    /// Spans da segmentação `name` em offsets absolutos.
    pub fn absolute_spans(&self, name: &str) -> Result<Vec<Span>> {
        resolve_chain(self, name, None)
    }

    pub fn add_annotation_set(&mut self, set: AnnotationSet) {
        self.annotations.insert(set.name.clone(), set);
    }

    pub fn annotation_set(&self, name: &str) -> Option<&AnnotationSet> {
        self.annotations.get(name)
    }

    /// Anotações do conjunto `name` em offsets absolutos.
    pub fn reference_annotations(&self, name: &str) -> Result<Vec<Tag>> {
        self.annotation_set(name)
            .ok_or_else(|| SemError::UnknownAnnotationSet(name.to_string()))?
            .get_reference_annotations(self)
    }

    /// Texto coberto por um span absoluto; vazio se o span não cair em fronteiras válidas.
    pub fn text(&self, span: &Span) -> &str {
        self.content.get(span.lb()..span.ub()).unwrap_or("")
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }
}
