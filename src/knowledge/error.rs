use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("embedding matrix has {actual} rows for {expected} items")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("embedding row for item '{id}' has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },
}
