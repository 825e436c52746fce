//! # Templates de Features
//!
//! Transforma os tokens de uma sentença na matriz estilo CoNLL entregue ao
//! rotulador: **uma linha por token, uma coluna por template**.
//!
//! ```text
//! token    word     lower    suffix3  shape  dict
//! Marie    Marie    marie    rie      Xx     B-PER
//! Curie    Curie    curie    rie      Xx     I-PER
//! est      est      est      est      x      O
//! ```
//!
//! ## Templates Implementados
//!
//! - Forma da palavra, original e em minúsculas
//! - Prefixos e sufixos de `n` grafemas (um acento combinado conta como um)
//! - Forma ortográfica comprimida (`"Dupont"` → `Xx`, `"A380"` → `Xd`)
//! - Capitalização inicial e presença de dígitos (`1`/`0`)
//! - Palavra vizinha (janela de contexto, `BOS`/`EOS` nas bordas)
//! - Tags de dicionário multipalavra, via [`multiword_dictionary_scan`]

use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use crate::trie::{multiword_dictionary_scan, Trie};

/// Uma coluna da matriz de features.
#[derive(Debug, Clone)]
pub enum FeatureTemplate {
    Word,
    Lower,
    Prefix(usize),
    Suffix(usize),
    Shape,
    IsCapitalized,
    HasDigit,
    /// Palavra na posição relativa `offset` (ex: `-1` para a anterior).
    Window(isize),
    /// Tags `B{appendice}`/`I{appendice}`/`O` do casamento mais longo na trie.
    Dictionary { trie: Arc<Trie>, appendice: String },
}

impl FeatureTemplate {
    /// Nome da coluna, usado em cabeçalhos e logs.
    pub fn name(&self) -> String {
        match self {
            FeatureTemplate::Word => "word".to_string(),
            FeatureTemplate::Lower => "lower".to_string(),
            FeatureTemplate::Prefix(n) => format!("prefix{n}"),
            FeatureTemplate::Suffix(n) => format!("suffix{n}"),
            FeatureTemplate::Shape => "shape".to_string(),
            FeatureTemplate::IsCapitalized => "is_capitalized".to_string(),
            FeatureTemplate::HasDigit => "has_digit".to_string(),
            FeatureTemplate::Window(offset) => format!("word[{offset:+}]"),
            FeatureTemplate::Dictionary { appendice, .. } => format!("dict{appendice}"),
        }
    }

    /// Valores da coluna para uma sentença inteira.
    fn column(&self, tokens: &[&str]) -> Vec<String> {
        match self {
            FeatureTemplate::Dictionary { trie, appendice } => {
                multiword_dictionary_scan(tokens, trie, appendice)
            }
            FeatureTemplate::Window(offset) => (0..tokens.len())
                .map(|i| window(tokens, i, *offset))
                .collect(),
            _ => tokens.iter().map(|token| self.token_value(token)).collect(),
        }
    }

    fn token_value(&self, token: &str) -> String {
        match self {
            FeatureTemplate::Word => token.to_string(),
            FeatureTemplate::Lower => token.to_lowercase(),
            FeatureTemplate::Prefix(n) => token.graphemes(true).take(*n).collect(),
            FeatureTemplate::Suffix(n) => {
                let graphemes: Vec<&str> = token.graphemes(true).collect();
                graphemes[graphemes.len().saturating_sub(*n)..].concat()
            }
            FeatureTemplate::Shape => shape(token),
            FeatureTemplate::IsCapitalized => flag(token.chars().next().is_some_and(char::is_uppercase)),
            FeatureTemplate::HasDigit => flag(token.chars().any(|c| c.is_ascii_digit())),
            FeatureTemplate::Window(_) | FeatureTemplate::Dictionary { .. } => token.to_string(),
        }
    }
}

/// Conjunto padrão de templates para um rotulador de entidades.
pub fn default_templates() -> Vec<FeatureTemplate> {
    vec![
        FeatureTemplate::Word,
        FeatureTemplate::Lower,
        FeatureTemplate::Prefix(3),
        FeatureTemplate::Suffix(3),
        FeatureTemplate::Shape,
        FeatureTemplate::IsCapitalized,
        FeatureTemplate::HasDigit,
        FeatureTemplate::Window(-1),
        FeatureTemplate::Window(1),
    ]
}

/// Matriz de features de uma sentença: `matrix[i][j]` é o template `j` no token `i`.
pub fn extract_features(tokens: &[&str], templates: &[FeatureTemplate]) -> Vec<Vec<String>> {
    let columns: Vec<Vec<String>> = templates.iter().map(|t| t.column(tokens)).collect();
    (0..tokens.len())
        .map(|i| columns.iter().map(|column| column[i].clone()).collect())
        .collect()
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

fn window(tokens: &[&str], i: usize, offset: isize) -> String {
    let target = i as isize + offset;
    if target < 0 {
        "BOS".to_string()
    } else {
        tokens
            .get(target as usize)
            .map(|t| t.to_string())
            .unwrap_or_else(|| "EOS".to_string())
    }
}

/// Forma ortográfica com repetições comprimidas.
fn shape(token: &str) -> String {
    let mut out = String::new();
    for c in token.chars() {
        let class = if c.is_uppercase() {
            'X'
        } else if c.is_lowercase() {
            'x'
        } else if c.is_numeric() {
            'd'
        } else {
            c
        };
        if !out.ends_with(class) {
            out.push(class);
        }
    }
    out
}
