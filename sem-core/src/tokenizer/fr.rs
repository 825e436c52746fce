//! # Regras para o Francês
//!
//! - Títulos antes de nome (`Dr.`, `Mme.`, `Mlle.`, `M.`, `St.`) não cortam no ponto.
//! - Clíticos verbais viram token próprio: `"va-t-il"` → `"va"`, `"-t-il"`,
//!   salvo em compostos como `"rendez-vous"` e `"vous-même"`.
//! - Elisão corta após o apóstrofo (`"l'homme"`), exceto `"aujourd'hui"`.
//! - Ordinais ficam colados ao número (`"1er"`, `"XXe"`, `"3ème"`).
//! - Uma linha em branco encerra a sentença mesmo sem pontuação final.

use crate::config::{ApostrophePolicy, LanguageConfig};

use super::default::{APOSTROPHES, ATOMIC, CLOSERS, OPENERS};
use super::{ACRONYM_PATTERN, EMAIL_PATTERN, FIXED_ABBREVIATIONS_PATTERN, URL_PATTERN};

/// Abreviações que precedem um nome próprio.
pub const TITLE_PATTERN: &str = r"(?i)\b(?:dr|me?lles?|mme?s?|mr?s?|st)\.";
pub const CLITIC_PATTERN: &str = r"(?i)-(?:je|tu|nous|vous|(?:t-)?(?:on|ils?|elles?))\b";
pub const ELISION_EXCEPTIONS: &str = r"(?i)\baujourd['’]hui\b";
/// Compostos lexicalizados em que o hífen não introduz um clítico.
pub const HYPHEN_EXCEPTIONS: &str = r"(?i)\b(?:rendez-vous|(?:moi|toi|lui|elle|soi|nous|vous|eux|elles)-mêmes?)\b";
pub const ORDINAL_SUFFIX: &str = r"(?i)(?:er|ers|re|res|ère|ères|e|ème|es|èmes|nd|nde)\b";

pub fn config() -> LanguageConfig {
    LanguageConfig {
        code: "fr".to_string(),
        atomic: ATOMIC.to_string(),
        apostrophes: APOSTROPHES.to_string(),
        apostrophe_policy: ApostrophePolicy::SplitAfter,
        forbidden: vec![
            URL_PATTERN.to_string(),
            EMAIL_PATTERN.to_string(),
            ACRONYM_PATTERN.to_string(),
            FIXED_ABBREVIATIONS_PATTERN.to_string(),
            TITLE_PATTERN.to_string(),
            ELISION_EXCEPTIONS.to_string(),
            HYPHEN_EXCEPTIONS.to_string(),
        ],
        forced: vec![CLITIC_PATTERN.to_string()],
        ordinal_suffix: Some(ORDINAL_SUFFIX.to_string()),
        openers: OPENERS.to_string(),
        closers: CLOSERS.to_string(),
        blank_line_splits_sentences: true,
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Language;
    use crate::tokenizer::{texts, RuleTokenizer, Tokenizer};

    fn tokenizer() -> RuleTokenizer {
        RuleTokenizer::for_language(Language::French).unwrap()
    }

    #[test]
    fn test_title_before_name_and_sentences() {
        let tok = tokenizer();
        let text = "Dr. Dupont est parti. Il reviendra.";
        let tokens = tok.word_spans(text);
        let sentences = tok.sentence_spans(text, &tokens);
        assert_eq!(sentences.len(), 2);

        let first = &tokens[sentences[0].lb()..sentences[0].ub()];
        let second = &tokens[sentences[1].lb()..sentences[1].ub()];
        assert_eq!(texts(text, first), vec!["Dr.", "Dupont", "est", "parti", "."]);
        assert_eq!(texts(text, second), vec!["Il", "reviendra", "."]);
    }

    #[test]
    fn test_other_titles() {
        let tok = tokenizer();
        let text = "Mme. Curie et M. Blanc";
        assert_eq!(
            texts(text, &tok.word_spans(text)),
            vec!["Mme.", "Curie", "et", "M.", "Blanc"]
        );
    }

    #[test]
    fn test_verb_clitics() {
        let tok = tokenizer();
        let text = "Que va-t-il faire ? Viens-tu ?";
        assert_eq!(
            texts(text, &tok.word_spans(text)),
            vec!["Que", "va", "-t-il", "faire", "?", "Viens", "-tu", "?"]
        );
    }

    #[test]
    fn test_elision() {
        let tok = tokenizer();
        let text = "l'homme qu'on voit aujourd'hui";
        assert_eq!(
            texts(text, &tok.word_spans(text)),
            vec!["l'", "homme", "qu'", "on", "voit", "aujourd'hui"]
        );
    }

    #[test]
    fn test_ordinals_and_units() {
        let tok = tokenizer();
        let text = "le 1er mai, 3ème étage, 12kg";
        assert_eq!(
            texts(text, &tok.word_spans(text)),
            vec!["le", "1er", "mai", ",", "3ème", "étage", ",", "12", "kg"]
        );
    }

    #[test]
    fn test_plural_ordinals() {
        let tok = tokenizer();
        let text = "les 1ers et les 1res.";
        assert_eq!(
            texts(text, &tok.word_spans(text)),
            vec!["les", "1ers", "et", "les", "1res", "."]
        );
    }

    #[test]
    fn test_hyphenated_compounds_are_not_clitics() {
        let tok = tokenizer();
        let text = "Rendez-vous pris, nous-mêmes. Allez-vous partir ?";
        assert_eq!(
            texts(text, &tok.word_spans(text)),
            vec!["Rendez-vous", "pris", ",", "nous-mêmes", ".", "Allez", "-vous", "partir", "?"]
        );
    }

    #[test]
    fn test_blank_line_ends_sentence() {
        let tok = tokenizer();
        let text = "Titre sans point\n\nLe texte commence ici.";
        let tokens = tok.word_spans(text);
        let sentences = tok.sentence_spans(text, &tokens);
        assert_eq!(sentences.len(), 2);
        assert_eq!(texts(text, &tokens[sentences[0].lb()..sentences[0].ub()]), vec!["Titre", "sans", "point"]);

        let paragraphs = tok.paragraph_spans(text, &sentences, &tokens);
        assert_eq!(paragraphs.len(), 2);
    }

    #[test]
    fn test_quotes_hold_sentence() {
        let tok = tokenizer();
        let text = "Il a dit « Non. Jamais. » puis il est sorti.";
        let tokens = tok.word_spans(text);
        assert_eq!(tok.sentence_spans(text, &tokens).len(), 1);
    }
}
