//! # Interface com o Rotulador de Sequências
//!
//! O algoritmo de rotulação fica fora deste crate. O pipeline só conhece este
//! trait: entrega as matrizes de features de todas as sentenças e recebe de
//! volta uma coluna de tags por sentença, num dos esquemas BIO/BILOU/BIOES.
//!
//! Um rotulador que roda como processo externo deve reportar falha (status de
//! saída não nulo, saída ilegível) como [`SemError::Labeler`](crate::error::SemError::Labeler).
//! O pipeline trata esse erro como fatal e não tenta de novo.

use crate::error::Result;

/// Matriz de features de uma sentença: uma linha por token.
pub type SentenceMatrix = Vec<Vec<String>>;

pub trait SequenceLabeler: Send + Sync {
    /// Nome usado em logs e eventos.
    fn name(&self) -> &str;

    /// Uma coluna de tags por sentença, com uma tag por token.
    fn label(&self, sentences: &[SentenceMatrix]) -> Result<Vec<Vec<String>>>;
}
