//! # Trie de Sequências de Tokens
//!
//! Árvore de prefixos sobre **tokens** (não caracteres), usada para buscar
//! expressões multipalavra de um dicionário (`"new york city"`, `"São Paulo"`).
//!
//! Os nós ficam num arena (`Vec<TrieNode>`) indexado por inteiro. O fim de uma
//! sequência é o campo `terminal` do nó, que pode carregar um valor.
//!
//! ## Busca gulosa
//!
//! [`multiword_dictionary_scan`] percorre o fluxo de tokens e, em cada posição,
//! fica com o **casamento mais longo**:
//!
//! ```text
//! dicionário: {"new york", "new york city"}
//! tokens:     I  live  in  new  york  city  .
//! tags:       O  O     O   B    I     I     O
//! ```
//!
//! Depois de construída, a trie é só leitura e pode ser compartilhada entre
//! threads.

use std::collections::BTreeMap;
use std::io::BufRead;

use tracing::debug;

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TrieNode {
    children: BTreeMap<String, usize>,
    terminal: bool,
    value: Option<String>,
}

const ROOT: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    len: usize,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalização aplicada a cada linha de dicionário antes do corte em tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cleaner {
    Identity,
    #[default]
    Strip,
    Lower,
    StripLower,
}

impl Cleaner {
    pub fn apply(&self, entry: &str) -> String {
        match self {
            Cleaner::Identity => entry.to_string(),
            Cleaner::Strip => entry.trim().to_string(),
            Cleaner::Lower => entry.to_lowercase(),
            Cleaner::StripLower => entry.trim().to_lowercase(),
        }
    }
}

/// Como uma linha de dicionário vira uma sequência de tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Splitter {
    #[default]
    Whitespace,
    /// A linha inteira é um único token.
    Whole,
}

impl Splitter {
    pub fn split<'a>(&self, entry: &'a str) -> Vec<&'a str> {
        match self {
            Splitter::Whitespace => entry.split_whitespace().collect(),
            Splitter::Whole if entry.is_empty() => Vec::new(),
            Splitter::Whole => vec![entry],
        }
    }
}

impl Trie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            len: 0,
        }
    }

    /// Constrói a partir de entradas de dicionário.
    ///
    /// Uma entrada pode trazer um valor após uma tabulação: `"new york\tLOC"`.
    /// Entradas vazias depois da limpeza são ignoradas.
    pub fn compile<I, S>(entries: I, cleaner: Cleaner, splitter: Splitter) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = Self::new();
        for entry in entries {
            let (words, value) = match entry.as_ref().split_once('\t') {
                Some((words, value)) => (words, Some(value.trim())),
                None => (entry.as_ref(), None),
            };
            let cleaned = cleaner.apply(words);
            let sequence = splitter.split(&cleaned);
            if sequence.is_empty() {
                continue;
            }
            match value {
                Some(value) => trie.add_with_value(&sequence, value),
                None => trie.add(&sequence),
            }
        }
        debug!(entries = trie.len(), nodes = trie.nodes.len(), "trie compiled");
        trie
    }

    /// Lê um dicionário com uma entrada por linha.
    pub fn from_reader<R: BufRead>(reader: R, cleaner: Cleaner, splitter: Splitter) -> Result<Self> {
        let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
        Ok(Self::compile(lines, cleaner, splitter))
    }

    /// Insere uma sequência, marcando o nó final como terminal.
    pub fn add<S: AsRef<str>>(&mut self, sequence: &[S]) {
        self.insert(sequence, None);
    }

    pub fn add_with_value<S: AsRef<str>>(&mut self, sequence: &[S], value: impl Into<String>) {
        self.insert(sequence, Some(value.into()));
    }

    fn insert<S: AsRef<str>>(&mut self, sequence: &[S], value: Option<String>) {
        let mut current = ROOT;
        for token in sequence {
            let token = token.as_ref();
            current = match self.nodes[current].children.get(token) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[current].children.insert(token.to_string(), child);
                    child
                }
            };
        }
        let node = &mut self.nodes[current];
        if !node.terminal {
            node.terminal = true;
            self.len += 1;
        }
        if value.is_some() {
            node.value = value;
        }
    }

    /// Nó alcançado a partir da raiz seguindo `sequence`, se existir.
    pub fn goto<S: AsRef<str>>(&self, sequence: &[S]) -> Option<usize> {
        sequence
            .iter()
            .try_fold(ROOT, |node, token| self.child(node, token.as_ref()))
    }

    pub fn child(&self, node: usize, token: &str) -> Option<usize> {
        self.nodes.get(node)?.children.get(token).copied()
    }

    pub fn is_terminal(&self, node: usize) -> bool {
        self.nodes.get(node).map(|n| n.terminal).unwrap_or(false)
    }

    pub fn value(&self, node: usize) -> Option<&str> {
        self.nodes.get(node)?.value.as_deref()
    }

    /// A sequência foi inserida inteira (e não é só prefixo de outra).
    pub fn contains<S: AsRef<str>>(&self, sequence: &[S]) -> bool {
        self.goto(sequence)
            .map(|node| self.is_terminal(node))
            .unwrap_or(false)
    }

    /// Número de sequências distintas.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sequências armazenadas, em pré-ordem com filhos em ordem lexicográfica.
    pub fn iter(&self) -> TrieIter<'_> {
        TrieIter {
            trie: self,
            stack: vec![(ROOT, Vec::new())],
        }
    }
}

/// Iterador em profundidade com pilha explícita. Pode ser recriado a qualquer momento.
pub struct TrieIter<'a> {
    trie: &'a Trie,
    stack: Vec<(usize, Vec<&'a str>)>,
}

impl<'a> Iterator for TrieIter<'a> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        let trie = self.trie;
        while let Some((node, path)) = self.stack.pop() {
            let current = &trie.nodes[node];
            for (token, &child) in current.children.iter().rev() {
                let mut next = path.clone();
                next.push(token.as_str());
                self.stack.push((child, next));
            }
            if current.terminal {
                return Some(path);
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a Trie {
    type Item = Vec<&'a str>;
    type IntoIter = TrieIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Marca com `B{appendice}`/`I{appendice}` os trechos de `tokens` que casam
/// com a trie, sempre preferindo o casamento mais longo. Os demais tokens
/// recebem `O`. Nunca falha; uma lista vazia produz uma coluna vazia.
pub fn multiword_dictionary_scan<S: AsRef<str>>(tokens: &[S], trie: &Trie, appendice: &str) -> Vec<String> {
    let length = tokens.len();
    let mut tags = vec!["O".to_string(); length];
    let mut fst = 0;
    while fst < length {
        // fim (exclusivo) do último casamento completo visto a partir de `fst`
        let mut lst: Option<usize> = None;
        let mut node = ROOT;
        for (cur, token) in tokens.iter().enumerate().skip(fst) {
            match trie.child(node, token.as_ref()) {
                Some(next) => {
                    node = next;
                    if trie.is_terminal(node) {
                        lst = Some(cur + 1);
                    }
                }
                None => break,
            }
        }

        match lst {
            Some(end) => {
                tags[fst] = format!("B{appendice}");
                for tag in &mut tags[fst + 1..end] {
                    *tag = format!("I{appendice}");
                }
                fst = end;
            }
            None => fst += 1,
        }
    }
    tags
}
