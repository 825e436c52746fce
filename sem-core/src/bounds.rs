//! # Acumulador de Fronteiras
//!
//! Durante a varredura do texto, o tokenizador não produz tokens diretamente:
//! ele registra **fronteiras** (pontos ou trechos onde há corte). Os tokens são
//! os intervalos entre fronteiras consecutivas.
//!
//! - Fronteira de largura zero: corte entre dois caracteres (ex: `"parti|."`).
//! - Fronteira com largura: trecho descartado entre tokens (espaços).
//!
//! ## Zonas proibidas
//!
//! URLs, e-mails e abreviações são registrados antes da varredura. Nenhuma
//! fronteira que toque uma posição interna dessas zonas é aceita, e a rejeição
//! é silenciosa.

use std::ops::Range;

use regex::Regex;

use crate::span::Span;

/// Lista ordenada de fronteiras candidatas para uma única string.
///
/// As fronteiras ficam ordenadas por `lb` e nunca se sobrepõem.
#[derive(Debug, Clone, Default)]
pub struct SpannedBounds {
    bounds: Vec<Span>,
    /// Posições onde nenhum corte pode acontecer (intervalos internos das zonas).
    forbidden: Vec<Range<usize>>,
}

impl SpannedBounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn as_slice(&self) -> &[Span] {
        &self.bounds
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.bounds.iter()
    }

    /// Marca como proibidas as posições `start+1 .. end` de cada casamento.
    pub fn add_forbidden_regex(&mut self, pattern: &Regex, text: &str) {
        for m in pattern.find_iter(text) {
            if m.end() > m.start() + 1 {
                self.forbidden.push(m.start() + 1..m.end());
            }
        }
    }

    /// Insere cortes em `start` e `end` de cada casamento, isolando o trecho
    /// casado como um token próprio (ex: `"va-t-il"` → `"va"`, `"-t-il"`).
    pub fn force_regex(&mut self, pattern: &Regex, text: &str) {
        for m in pattern.find_iter(text) {
            self.add(Span::point(m.start()));
            self.add(Span::point(m.end()));
        }
    }

    /// Verdadeiro se alguma posição de `[span.lb, span.ub]` é proibida.
    pub fn is_forbidden(&self, span: &Span) -> bool {
        self.forbidden
            .iter()
            .any(|zone| zone.start <= span.ub() && span.lb() < zone.end)
    }

    /// Anexa ao fim. Ignorado se proibido, duplicado ou sobreposto ao último.
    pub fn append(&mut self, span: Span) -> bool {
        if self.is_forbidden(&span) {
            return false;
        }
        if let Some(last) = self.bounds.last() {
            if *last == span || last.ub() > span.lb() {
                return false;
            }
        }
        self.bounds.push(span);
        true
    }

    /// Como [`append`](Self::append), mas funde com a última fronteira quando
    /// `span.lb == last.ub` (sequências de espaços viram uma só fronteira).
    pub fn add_last(&mut self, span: Span) -> bool {
        if self.is_forbidden(&span) {
            return false;
        }
        match self.bounds.last_mut() {
            Some(last) if last.ub() == span.lb() => {
                let grow = span.ub() - last.ub();
                last.expand_ub(grow);
                true
            }
            Some(last) if last.ub() > span.lb() => false,
            _ => {
                self.bounds.push(span);
                true
            }
        }
    }

    /// Insere na posição ordenada por `lb`. Ignorado se o ponto já está
    /// coberto por uma fronteira existente ou se toca uma zona proibida.
    pub fn add(&mut self, span: Span) -> bool {
        if self.is_forbidden(&span) {
            return false;
        }
        let (index, found) = self.find(span.lb());
        if found {
            return false;
        }
        if let Some(next) = self.bounds.get(index) {
            if next.lb() <= span.ub() && !span.is_empty() {
                return false;
            }
        }
        self.bounds.insert(index, span);
        true
    }

    /// Localiza o slot para a posição `i`.
    ///
    /// Retorna `(índice, true)` se `i` já está dentro de uma fronteira
    /// (`lb <= i <= ub`), ou `(índice de inserção, false)` caso contrário.
    pub fn find(&self, i: usize) -> (usize, bool) {
        let index = self.bounds.partition_point(|b| b.ub() < i);
        let found = self
            .bounds
            .get(index)
            .map(|b| b.lb() <= i)
            .unwrap_or(false);
        (index, found)
    }

    /// Converte os intervalos entre fronteiras em spans, descartando os vazios.
    pub fn to_spans(&self) -> Vec<Span> {
        self.bounds
            .windows(2)
            .filter(|pair| pair[0].ub() < pair[1].lb())
            .map(|pair| Span::new(pair[0].ub(), pair[1].lb()))
            .collect()
    }
}
