//! # Configuração de Idioma
//!
//! As regras de classificação de cada idioma são dados, não código: um
//! [`LanguageConfig`] é construído uma única vez (preset embutido ou arquivo
//! TOML), compilado em um [`RuleTokenizer`](crate::tokenizer::RuleTokenizer) e
//! compartilhado somente para leitura a partir daí.
//!
//! ## Exemplo de TOML
//!
//! ```toml
//! code = "xx"
//! atomic = ";:()[]"
//! apostrophes = "'’"
//! apostrophe_policy = "split_after"
//! forbidden = ['(?i)\bdr\.']
//! openers = "(["
//! closers = ")]"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tokenizer::{default, en, fr};

/// Idiomas com preset embutido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Default,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Default => "default",
            Language::French => "fr",
            Language::English => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "default" => Some(Language::Default),
            "fr" => Some(Language::French),
            "en" => Some(Language::English),
            _ => None,
        }
    }

    /// Preset de regras do idioma.
    pub fn config(&self) -> LanguageConfig {
        match self {
            Language::Default => default::config(),
            Language::French => fr::config(),
            Language::English => en::config(),
        }
    }
}

/// Tratamento do apóstrofo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApostrophePolicy {
    /// Corta logo após o apóstrofo: `"l'homme"` → `"l'"`, `"homme"`.
    #[default]
    SplitAfter,
    /// Mantém o apóstrofo entre duas letras; fora disso isola-o dos dois lados.
    /// Contrações (`n't`, `'s`) ficam a cargo de `forced`.
    KeepWordInternal,
}

/// Regras de um idioma, na forma serializável.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub code: String,
    /// Caracteres que sempre viram um token isolado.
    #[serde(default)]
    pub atomic: String,
    #[serde(default)]
    pub apostrophes: String,
    #[serde(default)]
    pub apostrophe_policy: ApostrophePolicy,
    /// Regex cujos casamentos não podem ser cortados por dentro
    /// (URLs, e-mails, siglas, abreviações antes de nome).
    #[serde(default)]
    pub forbidden: Vec<String>,
    /// Regex cujos casamentos sempre viram token próprio (clíticos, contrações).
    #[serde(default)]
    pub forced: Vec<String>,
    /// Sufixo ordinal mantido colado ao número (ex: `"1er"`, `"21st"`).
    /// Ancorado no início do trecho que segue o último dígito.
    #[serde(default)]
    pub ordinal_suffix: Option<String>,
    #[serde(default)]
    pub openers: String,
    #[serde(default)]
    pub closers: String,
    /// Uma linha em branco entre dois tokens encerra a sentença.
    #[serde(default)]
    pub blank_line_splits_sentences: bool,
}

impl LanguageConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        default::config()
    }
}
