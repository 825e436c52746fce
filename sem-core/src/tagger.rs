//! # Codec de Chunks BIO / BILOU / BIOES
//!
//! Converte nos dois sentidos entre uma sequência plana de tags por token
//! (a coluna que o rotulador lê e escreve) e uma lista de [`Tag`]s com span.
//!
//! ## Tabela de Flags
//!
//! | esquema | begin | in | last | single | out |
//! |---------|-------|----|------|--------|-----|
//! | BIO     | B     | I  | I    | B      | O   |
//! | BILOU   | B     | I  | L    | U      | O   |
//! | BIOES   | B     | I  | E    | S      | O   |
//!
//! A tabela é um valor ([`SchemeFlags`]) escolhido na chamada; tabelas
//! customizadas podem ser desserializadas.
//!
//! ## Formato das Tags
//!
//! `"{flag}-{valor}"` (ex: `B-PER`, `L-LOC`), ou apenas a flag `out` (`O`).
//!
//! ## Exemplo
//!
//! ```text
//! B-PER I-PER O B-LOC   →   PER [0,2)  LOC [3,4)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::annotation::{get_top_level, sort_annotations, Tag};
use crate::error::{Result, SemError};
use crate::segmentation::Segmentation;
use crate::span::Span;

/// Esquemas de chunk embutidos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Bio,
    Bilou,
    Bioes,
}

impl Scheme {
    pub fn flags(&self) -> SchemeFlags {
        match self {
            Scheme::Bio => SchemeFlags::bio(),
            Scheme::Bilou => SchemeFlags::bilou(),
            Scheme::Bioes => SchemeFlags::bioes(),
        }
    }
}

/// Papel de um token dentro de um chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Begin,
    In,
    Last,
    Single,
    Out,
}

/// Tabela de prefixos de um esquema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeFlags {
    pub name: String,
    pub begin: String,
    pub inside: String,
    pub last: String,
    pub single: String,
    pub out: String,
}

impl SchemeFlags {
    fn table(name: &str, last: &str, single: &str) -> Self {
        Self {
            name: name.to_string(),
            begin: "B".to_string(),
            inside: "I".to_string(),
            last: last.to_string(),
            single: single.to_string(),
            out: "O".to_string(),
        }
    }

    pub fn bio() -> Self {
        Self::table("BIO", "I", "B")
    }

    pub fn bilou() -> Self {
        Self::table("BILOU", "L", "U")
    }

    pub fn bioes() -> Self {
        Self::table("BIOES", "E", "S")
    }

    /// Decompõe uma tag em `(flag, valor)`.
    ///
    /// As flags são testadas na ordem begin, in, last, single: no BIO, `B` é
    /// sempre begin e `I` sempre in. Retorna `None` para prefixos fora da tabela.
    pub fn parse<'a>(&self, tag: &'a str) -> Option<(Flag, &'a str)> {
        if tag == self.out {
            return Some((Flag::Out, ""));
        }
        let (prefix, value) = tag.split_once('-')?;
        let flag = if prefix == self.begin {
            Flag::Begin
        } else if prefix == self.inside {
            Flag::In
        } else if prefix == self.last {
            Flag::Last
        } else if prefix == self.single {
            Flag::Single
        } else if prefix == self.out {
            Flag::Out
        } else {
            return None;
        };
        Some((flag, value))
    }

    pub fn format(&self, flag: Flag, value: &str) -> String {
        let prefix = match flag {
            Flag::Begin => &self.begin,
            Flag::In => &self.inside,
            Flag::Last => &self.last,
            Flag::Single => &self.single,
            Flag::Out => return self.out.clone(),
        };
        format!("{prefix}-{value}")
    }
}

impl Default for SchemeFlags {
    fn default() -> Self {
        Self::bio()
    }
}

impl fmt::Display for SchemeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Chunk em construção durante a decodificação.
struct OpenChunk {
    value: String,
    start: usize,
    length: usize,
}

impl OpenChunk {
    fn new(value: &str, start: usize) -> Self {
        Self {
            value: value.to_string(),
            start,
            length: 1,
        }
    }

    fn close(self, shift: usize) -> Tag {
        Tag::new(self.value, Span::with_length(self.start + shift, self.length))
    }
}

/// Decodifica uma sequência de tags por token em chunks.
///
/// `shift` é somado ao início de cada chunk emitido. Em modo `strict`, valores
/// divergentes, continuações órfãs e prefixos desconhecidos são erros; fora
/// dele, a tag mais recente prevalece, uma continuação órfã abre um chunk e um
/// prefixo desconhecido é tratado como `out`.
pub fn chunks_to_annotation<S: AsRef<str>>(
    tags: &[S],
    shift: usize,
    flags: &SchemeFlags,
    strict: bool,
) -> Result<Vec<Tag>> {
    let mut chunks: Vec<Tag> = Vec::new();
    let mut current: Option<OpenChunk> = None;

    for (position, raw) in tags.iter().enumerate() {
        let raw = raw.as_ref();
        let (flag, value) = match flags.parse(raw) {
            Some(parsed) => parsed,
            None if strict => {
                return Err(SemError::UnknownTag {
                    position,
                    tag: raw.to_string(),
                    scheme: flags.name.clone(),
                })
            }
            None => {
                warn!(position, tag = raw, scheme = %flags, "unknown tag treated as out");
                (Flag::Out, "")
            }
        };

        match flag {
            Flag::Begin => {
                chunks.extend(current.take().map(|c| c.close(shift)));
                current = Some(OpenChunk::new(value, position));
            }
            Flag::Single => {
                chunks.extend(current.take().map(|c| c.close(shift)));
                chunks.push(OpenChunk::new(value, position).close(shift));
            }
            Flag::Out => {
                chunks.extend(current.take().map(|c| c.close(shift)));
            }
            Flag::In | Flag::Last => {
                let chunk = match current.take() {
                    Some(mut chunk) => {
                        if chunk.value != value {
                            if strict {
                                return Err(SemError::SchemeConsistency {
                                    position,
                                    expected: chunk.value,
                                    found: value.to_string(),
                                });
                            }
                            warn!(position, expected = %chunk.value, found = value, "inconsistent chunk, keeping latest value");
                            chunk.value = value.to_string();
                        }
                        chunk.length += 1;
                        chunk
                    }
                    None if strict => {
                        return Err(SemError::UnexpectedContinuation {
                            position,
                            tag: raw.to_string(),
                        })
                    }
                    None => OpenChunk::new(value, position),
                };
                if flag == Flag::Last {
                    chunks.push(chunk.close(shift));
                } else {
                    current = Some(chunk);
                }
            }
        }
    }
    chunks.extend(current.map(|c| c.close(shift)));
    Ok(chunks)
}

/// Codifica chunks numa coluna de `length` tags.
///
/// Os spans de `annotations` são índices de token; `offset` é subtraído de
/// cada um (início da sentença). Chunks fora do intervalo são ignorados; a
/// entrada não deve ter sobreposições (ver [`get_top_level`]).
pub fn encode_chunks(annotations: &[Tag], length: usize, offset: usize, flags: &SchemeFlags) -> Vec<String> {
    let mut column = vec![flags.out.clone(); length];
    for tag in annotations {
        let (lb, ub) = match (tag.lb().checked_sub(offset), tag.ub().checked_sub(offset)) {
            (Some(lb), Some(ub)) if lb < ub && ub <= length => (lb, ub),
            _ => continue,
        };
        if ub - lb == 1 {
            column[lb] = flags.format(Flag::Single, &tag.value);
            continue;
        }
        column[lb] = flags.format(Flag::Begin, &tag.value);
        for cell in &mut column[lb + 1..ub - 1] {
            *cell = flags.format(Flag::In, &tag.value);
        }
        column[ub - 1] = flags.format(Flag::Last, &tag.value);
    }
    column
}

/// Colunas de tags por sentença, mais as anotações descartadas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedCorpus {
    pub sentences: Vec<Vec<String>>,
    pub dropped: Vec<Tag>,
}

/// Codifica anotações (em índices de token) sentença a sentença.
///
/// Sobreposições são resolvidas por [`get_top_level`]. Uma anotação que começa
/// numa sentença e termina depois dela é descartada com aviso, nunca truncada.
pub fn add_to_corpus(annotations: &[Tag], sentences: &Segmentation, flags: &SchemeFlags) -> EncodedCorpus {
    let mut sorted = annotations.to_vec();
    sort_annotations(&mut sorted);
    let top = get_top_level(&sorted);

    let mut corpus = EncodedCorpus::default();
    let mut cursor = 0;
    for sentence in &sentences.spans {
        let mut inside: Vec<Tag> = Vec::new();
        while let Some(tag) = top.get(cursor) {
            if tag.lb() >= sentence.ub() {
                break;
            }
            cursor += 1;
            if tag.lb() < sentence.lb() || tag.ub() > sentence.ub() {
                warn!(tag = %tag.value, span = %tag.span, sentence = %sentence, "annotation crosses sentence boundary, dropped");
                corpus.dropped.push(tag.clone());
            } else {
                inside.push(tag.clone());
            }
        }
        corpus
            .sentences
            .push(encode_chunks(&inside, sentence.len(), sentence.lb(), flags));
    }
    for tag in &top[cursor..] {
        warn!(tag = %tag.value, span = %tag.span, "annotation outside every sentence, dropped");
        corpus.dropped.push(tag.clone());
    }
    corpus
}
