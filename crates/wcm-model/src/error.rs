use thiserror::Error;

use crate::ids::{ColumnId, Word};

/// Malformed rebuild input. The rebuild is aborted and the previous
/// generation keeps serving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("word '{word}' maps to zero columns")]
    EmptyWord { word: String },
    #[error("words '{first}' and '{second}' both normalize to '{word}'")]
    DuplicateWord {
        word: Word,
        first: String,
        second: String,
    },
    #[error("word '{word}' lists an empty column identifier")]
    EmptyColumnId { word: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapperError {
    #[error("invalid rebuild input: {0}")]
    Validation(#[from] ValidationError),
    #[error("no match for '{word}'")]
    WordNotFound { word: String, suggestions: Vec<Word> },
    #[error("column '{column}' is not indexed")]
    ColumnNotFound { column: ColumnId },
    #[error("set operation needs at least {required} resolvable words, got {resolved}")]
    InsufficientInput {
        resolved: usize,
        required: usize,
        unresolved: Vec<String>,
    },
    #[error("a rebuild is already in progress")]
    RebuildInProgress,
}

pub type Result<T> = std::result::Result<T, MapperError>;
