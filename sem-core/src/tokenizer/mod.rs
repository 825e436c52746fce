//! # Tokenizador por Regras
//!
//! Divide o texto bruto em três níveis encadeados:
//!
//! 1. **Tokens**: spans em offsets de byte do texto original.
//! 2. **Sentenças**: spans em índices de token.
//! 3. **Parágrafos**: spans em índices de sentença.
//!
//! ## Como funciona
//!
//! A varredura é feita caractere a caractere, registrando fronteiras em um
//! [`SpannedBounds`]. Cada idioma difere apenas nas regras de classificação,
//! descritas por um [`LanguageConfig`]:
//!
//! - **Espaço** sempre corta.
//! - **Atômicos** (`;:«»()[]{}=+*$£€/\"…%`) sempre viram token isolado.
//! - **`?`/`!`** e **reticências** (`..`, `...`) viram um único token por sequência.
//! - **Ponto** não corta entre dígitos (`3.5`) nem dentro de abreviações.
//! - **Vírgula** não corta entre dígitos (`3,5`).
//! - **Hífen** só corta quando encostado em espaço.
//! - **Dígitos** se separam de letras minúsculas coladas (`mp3`, `10km`),
//!   exceto sufixos ordinais (`1er`, `21st`).
//! - **URLs e e-mails** são zonas proibidas: nada corta por dentro.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use sem_core::config::Language;
//! use sem_core::tokenizer::{RuleTokenizer, Tokenizer};
//!
//! let tokenizer = RuleTokenizer::for_language(Language::French).unwrap();
//! let text = "Dr. Dupont est parti. Il reviendra.";
//! let tokens = tokenizer.word_spans(text);
//! let sentences = tokenizer.sentence_spans(text, &tokens);
//! assert_eq!(tokens.len(), 8);
//! assert_eq!(sentences.len(), 2);
//! ```

pub mod default;
pub mod en;
pub mod fr;

use regex::Regex;

use crate::bounds::SpannedBounds;
use crate::config::{ApostrophePolicy, Language, LanguageConfig};
use crate::error::Result;
use crate::span::Span;

/// URLs (com esquema ou `www.`), sem a pontuação final.
pub const URL_PATTERN: &str = r#"(?i)\b(?:https?://|ftp://|www\.)[^\s<>"«»]*[^\s<>"«».,;:!?)\]]"#;
pub const EMAIL_PATTERN: &str = r"[\w.+-]+@[\w-]+(?:\.[\w-]+)+";
/// Siglas com pontos: `U.S.A.`, `S.N.C.F.`
pub const ACRONYM_PATTERN: &str = r"\b(?:\p{Lu}\.){2,}";
pub const FIXED_ABBREVIATIONS_PATTERN: &str = r"(?i)\b(?:i\.e\.|e\.g\.|c-à-d)";

/// Estratégia de segmentação de um idioma.
///
/// Só as fronteiras precisam ser implementadas; a conversão em spans e a
/// detecção de parágrafos são comuns a todos os idiomas.
pub trait Tokenizer: Send + Sync {
    /// Fronteiras entre tokens, em offsets de byte.
    fn word_bounds(&self, content: &str) -> SpannedBounds;

    /// Fronteiras entre sentenças, em índices de token.
    fn sentence_bounds(&self, content: &str, tokens: &[Span]) -> SpannedBounds;

    /// Fronteiras entre parágrafos, em índices de sentença: há corte sempre que
    /// o trecho entre duas sentenças tem duas ou mais quebras de linha.
    fn paragraph_bounds(&self, content: &str, sentences: &[Span], tokens: &[Span]) -> SpannedBounds {
        let mut bounds = SpannedBounds::new();
        bounds.append(Span::point(0));
        for k in 1..sentences.len() {
            let previous_end = sentences[k - 1]
                .ub()
                .checked_sub(1)
                .and_then(|i| tokens.get(i))
                .map(Span::ub);
            let next_start = tokens.get(sentences[k].lb()).map(Span::lb);
            if let (Some(end), Some(start)) = (previous_end, next_start) {
                if count_newlines(gap(content, end, start)) >= 2 {
                    bounds.append(Span::point(k));
                }
            }
        }
        bounds.append(Span::point(sentences.len()));
        bounds
    }

    fn word_spans(&self, content: &str) -> Vec<Span> {
        self.word_bounds(content).to_spans()
    }

    fn sentence_spans(&self, content: &str, tokens: &[Span]) -> Vec<Span> {
        self.sentence_bounds(content, tokens).to_spans()
    }

    fn paragraph_spans(&self, content: &str, sentences: &[Span], tokens: &[Span]) -> Vec<Span> {
        self.paragraph_bounds(content, sentences, tokens).to_spans()
    }
}

/// Tokenizador guiado por um [`LanguageConfig`] compilado.
///
/// As regex são compiladas uma vez em [`RuleTokenizer::new`]; clonar é barato
/// e o valor pode ser compartilhado entre threads.
#[derive(Debug, Clone)]
pub struct RuleTokenizer {
    code: String,
    atomic: Vec<char>,
    apostrophes: Vec<char>,
    apostrophe_policy: ApostrophePolicy,
    forbidden: Vec<Regex>,
    forced: Vec<Regex>,
    ordinal_suffix: Option<Regex>,
    openers: Vec<char>,
    closers: Vec<char>,
    blank_line_splits_sentences: bool,
}

impl RuleTokenizer {
    pub fn new(config: &LanguageConfig) -> Result<Self> {
        let compile_all = |patterns: &[String]| -> Result<Vec<Regex>> {
            patterns
                .iter()
                .map(|p| Regex::new(p).map_err(Into::into))
                .collect()
        };
        let ordinal_suffix = match &config.ordinal_suffix {
            Some(pattern) => Some(Regex::new(&format!("^(?:{pattern})"))?),
            None => None,
        };

        Ok(Self {
            code: config.code.clone(),
            atomic: config.atomic.chars().collect(),
            apostrophes: config.apostrophes.chars().collect(),
            apostrophe_policy: config.apostrophe_policy,
            forbidden: compile_all(&config.forbidden)?,
            forced: compile_all(&config.forced)?,
            ordinal_suffix,
            openers: config.openers.chars().collect(),
            closers: config.closers.chars().collect(),
            blank_line_splits_sentences: config.blank_line_splits_sentences,
        })
    }

    pub fn for_language(language: Language) -> Result<Self> {
        Self::new(&language.config())
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    fn is_ordinal_suffix(&self, rest: &str) -> bool {
        self.ordinal_suffix
            .as_ref()
            .map(|re| re.is_match(rest))
            .unwrap_or(false)
    }
}

impl Tokenizer for RuleTokenizer {
    fn word_bounds(&self, content: &str) -> SpannedBounds {
        let mut bounds = SpannedBounds::new();
        for pattern in &self.forbidden {
            bounds.add_forbidden_regex(pattern, content);
        }
        bounds.append(Span::point(0));

        let chars: Vec<(usize, char)> = content.char_indices().collect();
        for (k, &(index, c)) in chars.iter().enumerate() {
            let next_index = index + c.len_utf8();
            let prev = k.checked_sub(1).map(|j| chars[j].1);
            let next = chars.get(k + 1).map(|&(_, n)| n);
            let digit_before = prev.map(|p| p.is_ascii_digit()).unwrap_or(false);
            let digit_after = next.map(|n| n.is_ascii_digit()).unwrap_or(false);

            if c.is_whitespace() {
                bounds.add_last(Span::new(index, next_index));
            } else if c == '?' || c == '!' {
                isolate_run(&mut bounds, index, next_index, prev, next, |x| x == '?' || x == '!');
            } else if c == '.' {
                if !(digit_before && digit_after) {
                    isolate_run(&mut bounds, index, next_index, prev, next, |x| x == '.');
                }
            } else if self.atomic.contains(&c) {
                isolate(&mut bounds, index, next_index);
            } else if self.apostrophes.contains(&c) {
                match self.apostrophe_policy {
                    ApostrophePolicy::SplitAfter => {
                        bounds.append(Span::point(next_index));
                    }
                    ApostrophePolicy::KeepWordInternal => {
                        let letter_before = prev.map(char::is_alphabetic).unwrap_or(false);
                        let letter_after = next.map(char::is_alphabetic).unwrap_or(false);
                        if !(letter_before && letter_after) {
                            isolate(&mut bounds, index, next_index);
                        }
                    }
                }
            } else if c.is_ascii_digit() {
                if let Some(p) = prev {
                    let glued = !p.is_whitespace()
                        && !p.is_ascii_digit()
                        && !",.-".contains(p)
                        && !p.is_uppercase();
                    if glued {
                        bounds.add_last(Span::point(index));
                    }
                }
            } else if c == ',' {
                if !(digit_before && digit_after) {
                    isolate(&mut bounds, index, next_index);
                }
            } else if c == '-' {
                let space_before = prev.map(char::is_whitespace).unwrap_or(true);
                let space_after = next.map(char::is_whitespace).unwrap_or(true);
                if space_before || space_after {
                    isolate(&mut bounds, index, next_index);
                }
            } else if c.is_alphabetic() && digit_before && !self.is_ordinal_suffix(&content[index..]) {
                // unidade colada ao número: "10km"
                bounds.add_last(Span::point(index));
            }
        }
        bounds.append(Span::point(content.len()));

        for pattern in &self.forced {
            bounds.force_regex(pattern, content);
        }
        bounds
    }

    fn sentence_bounds(&self, content: &str, tokens: &[Span]) -> SpannedBounds {
        let mut bounds = SpannedBounds::new();
        bounds.append(Span::point(0));

        let mut depth: usize = 0;
        for (i, token) in tokens.iter().enumerate() {
            if self.blank_line_splits_sentences && i > 0 {
                let between = gap(content, tokens[i - 1].ub(), token.lb());
                if count_newlines(between) > 1 {
                    bounds.append(Span::point(i));
                }
            }

            let text = gap(content, token.lb(), token.ub());
            if is_single_of(text, &self.openers) {
                depth += 1;
            } else if is_single_of(text, &self.closers) {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && is_terminator(text) {
                bounds.append(Span::point(i + 1));
            }
        }
        bounds.append(Span::point(tokens.len()));
        bounds
    }
}

/// Corta dos dois lados de um caractere.
fn isolate(bounds: &mut SpannedBounds, index: usize, next_index: usize) {
    bounds.add_last(Span::point(index));
    bounds.append(Span::point(next_index));
}

/// Corta antes do primeiro e depois do último caractere de uma sequência.
fn isolate_run(
    bounds: &mut SpannedBounds,
    index: usize,
    next_index: usize,
    prev: Option<char>,
    next: Option<char>,
    same_run: impl Fn(char) -> bool,
) {
    if !prev.map(&same_run).unwrap_or(false) {
        bounds.add_last(Span::point(index));
    }
    if !next.map(&same_run).unwrap_or(false) {
        bounds.append(Span::point(next_index));
    }
}

/// `.`, reticências ou sequência de `?`/`!`.
fn is_terminator(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| matches!(c, '.' | '?' | '!' | '…'))
}

fn is_single_of(text: &str, set: &[char]) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => set.contains(&c),
        _ => false,
    }
}

fn gap(content: &str, start: usize, end: usize) -> &str {
    content.get(start..end).unwrap_or("")
}

fn count_newlines(text: &str) -> usize {
    text.chars().filter(|&c| c == '\n').count()
}

#[cfg(test)]
pub(crate) fn texts<'a>(content: &'a str, spans: &[Span]) -> Vec<&'a str> {
    spans.iter().map(|s| &content[s.lb()..s.ub()]).collect()
}
