//! # Span: Intervalo Semiaberto
//!
//! Primitiva usada por todo o motor: um intervalo `[lb, ub)` sobre offsets de
//! byte (tokens) ou sobre índices de outra segmentação (sentenças, parágrafos).
//!
//! ## Invariante
//!
//! `lb <= ub` sempre. As mutações `set_lb`/`set_ub` são limitadas pelo outro
//! extremo, então o intervalo nunca se inverte.
//!
//! ## Representação persistida
//!
//! Em JSON um span é `{ "start": lb, "length": ub - lb }`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Intervalo semiaberto `[lb, ub)`.
///
/// # Exemplo
/// Em `"Dr. Dupont"`, o token `"Dupont"` é `Span::new(4, 10)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "SpanRecord", into = "SpanRecord")]
pub struct Span {
    lb: usize,
    ub: usize,
}

#[derive(Serialize, Deserialize)]
struct SpanRecord {
    start: usize,
    length: usize,
}

impl TryFrom<SpanRecord> for Span {
    type Error = String;

    fn try_from(record: SpanRecord) -> Result<Self, Self::Error> {
        Span::checked_with_length(record.start, record.length)
            .ok_or_else(|| overflow_message(record.start, record.length))
    }
}

/// Mensagem de erro para um registro `{start, length}` cujo fim não cabe em `usize`.
pub(crate) fn overflow_message(start: usize, length: usize) -> String {
    format!("span start {start} + length {length} overflows")
}

impl From<Span> for SpanRecord {
    fn from(span: Span) -> Self {
        SpanRecord {
            start: span.lb,
            length: span.len(),
        }
    }
}

impl Span {
    /// Cria um span a partir de dois extremos em qualquer ordem.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            lb: a.min(b),
            ub: a.max(b),
        }
    }

    /// Cria `[lb, lb + length)`. Sem normalização.
    pub fn with_length(lb: usize, length: usize) -> Self {
        Self {
            lb,
            ub: lb + length,
        }
    }

    /// Como [`with_length`](Self::with_length), mas `None` se `lb + length` transborda.
    pub fn checked_with_length(lb: usize, length: usize) -> Option<Self> {
        lb.checked_add(length).map(|ub| Self { lb, ub })
    }

    /// Span de largura zero em `i` (ponto de corte).
    pub fn point(i: usize) -> Self {
        Self { lb: i, ub: i }
    }

    pub fn lb(&self) -> usize {
        self.lb
    }

    pub fn ub(&self) -> usize {
        self.ub
    }

    pub fn len(&self) -> usize {
        self.ub - self.lb
    }

    pub fn is_empty(&self) -> bool {
        self.lb == self.ub
    }

    /// `lb <= i < ub`
    pub fn contains(&self, i: usize) -> bool {
        self.lb <= i && i < self.ub
    }

    /// `other` está inteiramente dentro de `self`.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.lb <= other.lb && other.ub <= self.ub
    }

    /// Define `lb`, limitado por `ub`.
    pub fn set_lb(&mut self, value: usize) {
        self.lb = value.min(self.ub);
    }

    /// Define `ub`, limitado por `lb`.
    pub fn set_ub(&mut self, value: usize) {
        self.ub = value.max(self.lb);
    }

    /// Estende o início `n` posições para a esquerda.
    pub fn expand_lb(&mut self, n: usize) {
        self.lb = self.lb.saturating_sub(n);
    }

    /// Estende o fim `n` posições para a direita.
    pub fn expand_ub(&mut self, n: usize) {
        self.ub += n;
    }

    /// Cópia deslocada de `n` posições.
    pub fn shifted(&self, n: usize) -> Self {
        Self {
            lb: self.lb + n,
            ub: self.ub + n,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lb, self.ub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_bounds() {
        let span = Span::new(7, 3);
        assert_eq!(span.lb(), 3);
        assert_eq!(span.ub(), 7);
        assert_eq!(span.len(), 4);
    }

    #[test]
    fn test_with_length() {
        let span = Span::with_length(5, 3);
        assert_eq!(span, Span::new(5, 8));
        assert!(Span::with_length(2, 0).is_empty());
    }

    #[test]
    fn test_contains() {
        let span = Span::new(2, 5);
        assert!(!span.contains(1));
        assert!(span.contains(2));
        assert!(span.contains(4));
        assert!(!span.contains(5));
        assert!(span.contains_span(&Span::new(2, 5)));
        assert!(span.contains_span(&Span::new(3, 4)));
        assert!(!span.contains_span(&Span::new(4, 6)));
    }

    #[test]
    fn test_mutation_is_clamped() {
        let mut span = Span::new(4, 8);
        span.set_lb(10);
        assert_eq!(span, Span::new(8, 8));

        let mut span = Span::new(4, 8);
        span.set_ub(1);
        assert_eq!(span, Span::new(4, 4));
    }

    #[test]
    fn test_expand() {
        let mut span = Span::point(3);
        span.expand_ub(2);
        assert_eq!(span, Span::new(3, 5));
        span.expand_lb(5);
        assert_eq!(span, Span::new(0, 5));
    }

    #[test]
    fn test_serde_start_length() {
        let json = serde_json::to_string(&Span::new(4, 10)).unwrap();
        assert_eq!(json, r#"{"start":4,"length":6}"#);
        let back: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Span::new(4, 10));
    }

    #[test]
    fn test_serde_rejects_overflowing_length() {
        let json = format!(r#"{{"start":{},"length":2}}"#, usize::MAX);
        assert!(serde_json::from_str::<Span>(&json).is_err());
        assert_eq!(Span::checked_with_length(usize::MAX, 0), Some(Span::point(usize::MAX)));
        assert_eq!(Span::checked_with_length(usize::MAX, 1), None);
    }
}
