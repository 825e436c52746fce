//! # sem-core: Motor de Segmentação e Anotação
//!
//! Este crate segmenta texto bruto em tokens, sentenças e parágrafos, gera a
//! matriz de features entregue a um rotulador de sequências e projeta as tags
//! devolvidas de volta para offsets de caractere.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui das folhas para a raiz:
//!
//! 1.  **Intervalos** ([`span`], [`bounds`]): `Span` semiaberto e o acumulador
//!     de fronteiras com zonas proibidas e cortes forçados.
//! 2.  **Tokenização** ([`tokenizer`]): regras por idioma (`default`, `fr`, `en`),
//!     configuradas por [`config::LanguageConfig`].
//! 3.  **Segmentações** ([`segmentation`], [`document`]): spans nomeados,
//!     relativos a outra segmentação, resolvidos por cadeia de referência.
//! 4.  **Anotações** ([`annotation`], [`tagger`]): tags com span e o codec
//!     BIO/BILOU/BIOES.
//! 5.  **Dicionários** ([`trie`], [`rule_based`]): busca multipalavra de
//!     casamento mais longo.
//! 6.  **Pipeline** ([`pipeline`]): features ([`features`]) → rotulador
//!     ([`labeler`]) → anotações em offsets de caractere.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use std::sync::Arc;
//! use sem_core::{AnnotationPipeline, DictionaryLabeler, Language, RuleTokenizer, Scheme, Trie};
//! use sem_core::trie::{Cleaner, Splitter};
//!
//! let tokenizer = RuleTokenizer::for_language(Language::French).unwrap();
//! let cities = Trie::compile(["Paris"], Cleaner::Strip, Splitter::Whitespace);
//! let labeler = DictionaryLabeler::new(Scheme::Bio.flags()).with_dictionary("LOC", cities);
//!
//! let pipeline = AnnotationPipeline::new(Arc::new(tokenizer), Arc::new(labeler));
//! let document = pipeline.analyze("exemple", "Dr. Dupont habite à Paris.").unwrap();
//!
//! for entity in pipeline.resolved_annotations(&document).unwrap() {
//!     println!("{} [{}, {}) {}", entity.value, entity.start, entity.end, entity.text);
//! }
//! ```

pub mod annotation;
pub mod bounds;
pub mod config;
pub mod document;
pub mod error;
pub mod features;
pub mod labeler;
pub mod pipeline;
pub mod rule_based;
pub mod segmentation;
pub mod span;
pub mod tagger;
pub mod tokenizer;
pub mod trie;

pub use annotation::{AnnotationSet, Tag};
pub use config::{Language, LanguageConfig};
pub use document::Document;
pub use error::{Result, SemError};
pub use labeler::SequenceLabeler;
pub use pipeline::{AnnotatedSpan, AnnotationPipeline, PipelineEvent};
pub use rule_based::DictionaryLabeler;
pub use segmentation::Segmentation;
pub use span::Span;
pub use tagger::{Scheme, SchemeFlags};
pub use tokenizer::{RuleTokenizer, Tokenizer};
pub use trie::Trie;
