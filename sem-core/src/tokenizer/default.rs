//! Regras neutras, usadas quando o idioma não tem preset próprio.

use crate::config::{ApostrophePolicy, LanguageConfig};

use super::{ACRONYM_PATTERN, EMAIL_PATTERN, FIXED_ABBREVIATIONS_PATTERN, URL_PATTERN};

pub const ATOMIC: &str = ";:«»()[]{}=+*$£€/\\\"…%";
pub const APOSTROPHES: &str = "'’ʼ";
pub const OPENERS: &str = "«([";
pub const CLOSERS: &str = "»)]";

pub fn config() -> LanguageConfig {
    LanguageConfig {
        code: "default".to_string(),
        atomic: ATOMIC.to_string(),
        apostrophes: APOSTROPHES.to_string(),
        apostrophe_policy: ApostrophePolicy::SplitAfter,
        forbidden: vec![
            URL_PATTERN.to_string(),
            EMAIL_PATTERN.to_string(),
            ACRONYM_PATTERN.to_string(),
            FIXED_ABBREVIATIONS_PATTERN.to_string(),
        ],
        forced: vec![],
        ordinal_suffix: None,
        openers: OPENERS.to_string(),
        closers: CLOSERS.to_string(),
        blank_line_splits_sentences: false,
    }
}
