use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("failed to load classifier model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("model file resolution failed: {0}")]
    Files(#[from] EmbeddingError),

    #[error("classifier inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("invalid classifier configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("invalid classification input: {reason}")]
    InvalidInput { reason: String },

    #[error("checkpoint id2label is missing the '{label}' label")]
    MissingNliLabel { label: &'static str },
}

impl From<candle_core::Error> for ClassifyError {
    fn from(err: candle_core::Error) -> Self {
        ClassifyError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}
