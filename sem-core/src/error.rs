//! # Erros do Motor de Segmentação e Anotação
//!
//! Apenas entradas estruturalmente inválidas geram erro. Ambiguidade linguística
//! (onde cortar um token, qual casamento de dicionário escolher) é resolvida por
//! regras determinísticas e nunca chega até aqui.

use thiserror::Error;

use crate::span::Span;

#[derive(Error, Debug)]
pub enum SemError {
    /// Um token `IN`/`LAST` carrega um valor diferente do chunk aberto (modo estrito).
    #[error("inconsistent chunk at token {position}: '{found}' continues a '{expected}' chunk")]
    SchemeConsistency {
        position: usize,
        expected: String,
        found: String,
    },

    /// Um token `IN`/`LAST` aparece sem nenhum chunk aberto (modo estrito).
    #[error("tag '{tag}' at token {position} continues a chunk that was never opened")]
    UnexpectedContinuation { position: usize, tag: String },

    /// Prefixo que não pertence à tabela de flags do esquema (modo estrito).
    #[error("tag '{tag}' at token {position} is not valid under the {scheme} scheme")]
    UnknownTag {
        position: usize,
        tag: String,
        scheme: String,
    },

    #[error("segmentation '{0}' does not exist")]
    UnknownSegmentation(String),

    #[error("annotation set '{0}' does not exist")]
    UnknownAnnotationSet(String),

    #[error("reference cycle detected through segmentation '{0}'")]
    ReferenceCycle(String),

    /// Um span relativo aponta para fora da segmentação de referência.
    #[error("span {span} is out of range for reference '{reference}' ({len} spans)")]
    IndexOutOfRange {
        span: Span,
        reference: String,
        len: usize,
    },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Falha do rotulador externo. Fatal: o chamador não deve tentar novamente.
    #[error("labeler failed: {0}")]
    Labeler(String),

    #[error("labeler returned {found} tags for sentence {sentence} of {expected} tokens")]
    LabelerOutput {
        sentence: usize,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, SemError>;
