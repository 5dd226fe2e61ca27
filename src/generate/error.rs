use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("provider error: {reason}")]
    ProviderError { reason: String },

    #[error("provider returned no text content")]
    EmptyCompletion,

    #[error("invalid generator configuration: {reason}")]
    InvalidConfig { reason: String },
}
