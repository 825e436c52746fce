//! # Regras para o Inglês
//!
//! - O apóstrofo fica dentro da palavra; contrações são separadas à força
//!   (`"don't"` → `"do"`, `"n't"`; `"John's"` → `"John"`, `"'s"`).
//! - Títulos (`Mr.`, `Mrs.`, `Dr.`, `Prof.`...) não cortam no ponto.
//! - Ordinais ficam colados ao número (`"21st"`, `"3rd"`).

use crate::config::{ApostrophePolicy, LanguageConfig};

use super::default::{APOSTROPHES, ATOMIC, CLOSERS, OPENERS};
use super::{ACRONYM_PATTERN, EMAIL_PATTERN, FIXED_ABBREVIATIONS_PATTERN, URL_PATTERN};

pub const TITLE_PATTERN: &str = r"(?i)\b(?:dr|mrs?|ms|prof|st|jr|sr|vs|mt)\.";
pub const NEGATION_PATTERN: &str = r"(?i)n['’]t\b";
pub const CONTRACTION_PATTERN: &str = r"(?i)['’](?:s|re|ve|ll|d|m)\b";
pub const ORDINAL_SUFFIX: &str = r"(?i)(?:st|nd|rd|th)\b";

pub fn config() -> LanguageConfig {
    LanguageConfig {
        code: "en".to_string(),
        atomic: ATOMIC.to_string(),
        apostrophes: APOSTROPHES.to_string(),
        apostrophe_policy: ApostrophePolicy::KeepWordInternal,
        forbidden: vec![
            URL_PATTERN.to_string(),
            EMAIL_PATTERN.to_string(),
            ACRONYM_PATTERN.to_string(),
            FIXED_ABBREVIATIONS_PATTERN.to_string(),
            TITLE_PATTERN.to_string(),
        ],
        forced: vec![NEGATION_PATTERN.to_string(), CONTRACTION_PATTERN.to_string()],
        ordinal_suffix: Some(ORDINAL_SUFFIX.to_string()),
        openers: OPENERS.to_string(),
        closers: CLOSERS.to_string(),
        blank_line_splits_sentences: false,
    }
}
