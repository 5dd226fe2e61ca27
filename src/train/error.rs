use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset: {reason}")]
    DatasetParse { reason: String },

    #[error("dataset is empty: {path}")]
    EmptyDataset { path: PathBuf },

    #[error("no trainable pairs after tokenization")]
    NoTrainablePairs,

    #[error("tokenization failed: {reason}")]
    Tokenization { reason: String },

    #[error("model error: {0}")]
    Model(#[from] candle_core::Error),

    #[error("invalid training configuration: {reason}")]
    InvalidConfig { reason: String },
}
