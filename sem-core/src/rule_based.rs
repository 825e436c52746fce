//! # Rotulador por Dicionários
//!
//! Implementação de [`SequenceLabeler`] sem modelo estatístico: cada rótulo tem
//! seu próprio dicionário multipalavra ([`Trie`]) e cada sentença é varrida com
//! a busca de casamento mais longo.
//!
//! ## Conflitos entre dicionários
//!
//! Os casamentos de todos os rótulos são ordenados por `(início, -fim)` e
//! filtrados por [`get_top_level`]: o trecho mais externo vence. Para trechos
//! idênticos vence o dicionário registrado primeiro (a ordenação é estável).
//!
//! ```text
//! ORG: {"Banco do Brasil"}    LOC: {"Brasil"}
//! o Banco do Brasil           →  O B-ORG I-ORG I-ORG
//! ```

use std::cmp::Reverse;

use tracing::debug;

use crate::annotation::{get_top_level, Tag};
use crate::error::{Result, SemError};
use crate::labeler::{SentenceMatrix, SequenceLabeler};
use crate::tagger::{chunks_to_annotation, encode_chunks, SchemeFlags};
use crate::trie::{multiword_dictionary_scan, Trie};

pub struct DictionaryLabeler {
    dictionaries: Vec<(String, Trie)>,
    scheme: SchemeFlags,
    /// Coluna da matriz que contém a palavra.
    word_column: usize,
    /// Compara em minúsculas (a trie deve ter sido compilada em minúsculas).
    case_insensitive: bool,
}

impl DictionaryLabeler {
    pub fn new(scheme: SchemeFlags) -> Self {
        Self {
            dictionaries: Vec::new(),
            scheme,
            word_column: 0,
            case_insensitive: false,
        }
    }

    pub fn with_dictionary(mut self, label: impl Into<String>, trie: Trie) -> Self {
        self.dictionaries.push((label.into(), trie));
        self
    }

    pub fn with_word_column(mut self, column: usize) -> Self {
        self.word_column = column;
        self
    }

    pub fn case_insensitive(mut self, value: bool) -> Self {
        self.case_insensitive = value;
        self
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.dictionaries.iter().map(|(label, _)| label.as_str())
    }

    /// Tags de uma sentença a partir das palavras.
    pub fn label_words<S: AsRef<str>>(&self, words: &[S]) -> Vec<String> {
        let words: Vec<String> = words
            .iter()
            .map(|w| {
                if self.case_insensitive {
                    w.as_ref().to_lowercase()
                } else {
                    w.as_ref().to_string()
                }
            })
            .collect();

        let bio = SchemeFlags::bio();
        let mut matches: Vec<Tag> = Vec::new();
        for (label, trie) in &self.dictionaries {
            let column = multiword_dictionary_scan(&words, trie, &format!("-{label}"));
            // a varredura só produz B/I/O válidos
            if let Ok(tags) = chunks_to_annotation(&column, 0, &bio, false) {
                matches.extend(tags);
            }
        }
        matches.sort_by_key(|tag| (tag.lb(), Reverse(tag.ub())));
        let top = get_top_level(&matches);
        encode_chunks(&top, words.len(), 0, &self.scheme)
    }
}

impl SequenceLabeler for DictionaryLabeler {
    fn name(&self) -> &str {
        "dictionary"
    }

    fn label(&self, sentences: &[SentenceMatrix]) -> Result<Vec<Vec<String>>> {
        let mut output = Vec::with_capacity(sentences.len());
        for (index, sentence) in sentences.iter().enumerate() {
            let words = sentence
                .iter()
                .map(|row| row.get(self.word_column).map(String::as_str))
                .collect::<Option<Vec<&str>>>()
                .ok_or_else(|| {
                    SemError::Labeler(format!("sentence {index} has no column {}", self.word_column))
                })?;
            output.push(self.label_words(&words));
        }
        debug!(sentences = sentences.len(), dictionaries = self.dictionaries.len(), "dictionary labeling done");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::Scheme;
    use crate::trie::{Cleaner, Splitter};

    fn labeler(scheme: Scheme) -> DictionaryLabeler {
        let org = Trie::compile(["Banco do Brasil"], Cleaner::Strip, Splitter::Whitespace);
        let loc = Trie::compile(["Brasil", "São Paulo"], Cleaner::Strip, Splitter::Whitespace);
        DictionaryLabeler::new(scheme.flags())
            .with_dictionary("ORG", org)
            .with_dictionary("LOC", loc)
    }

    #[test]
    fn test_outermost_match_wins() {
        let tags = labeler(Scheme::Bio).label_words(&["o", "Banco", "do", "Brasil", "em", "São", "Paulo"]);
        assert_eq!(tags, vec!["O", "B-ORG", "I-ORG", "I-ORG", "O", "B-LOC", "I-LOC"]);
    }

    #[test]
    fn test_scheme_is_applied() {
        let tags = labeler(Scheme::Bilou).label_words(&["Brasil", "e", "São", "Paulo"]);
        assert_eq!(tags, vec!["U-LOC", "O", "B-LOC", "L-LOC"]);
    }

    #[test]
    fn test_first_dictionary_wins_on_same_span() {
        let a = Trie::compile(["Paris"], Cleaner::Strip, Splitter::Whitespace);
        let b = Trie::compile(["Paris"], Cleaner::Strip, Splitter::Whitespace);
        let labeler = DictionaryLabeler::new(SchemeFlags::bio())
            .with_dictionary("PER", a)
            .with_dictionary("LOC", b);
        assert_eq!(labeler.label_words(&["Paris"]), vec!["B-PER"]);
    }

    #[test]
    fn test_case_insensitive() {
        let trie = Trie::compile(["new york"], Cleaner::StripLower, Splitter::Whitespace);
        let labeler = DictionaryLabeler::new(SchemeFlags::bio())
            .with_dictionary("LOC", trie)
            .case_insensitive(true);
        assert_eq!(labeler.label_words(&["New", "York"]), vec!["B-LOC", "I-LOC"]);
    }

    #[test]
    fn test_label_matrix() {
        let matrix = vec![vec![vec!["Brasil".to_string(), "x".to_string()]], vec![]];
        let out = labeler(Scheme::Bio).label(&matrix).unwrap();
        assert_eq!(out, vec![vec!["B-LOC".to_string()], vec![]]);

        let bad = labeler(Scheme::Bio).with_word_column(5).label(&matrix);
        assert!(matches!(bad, Err(SemError::Labeler(_))));
    }
}
