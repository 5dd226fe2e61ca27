use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::classify::ClassifyError;
use crate::generate::GenerateError;
use crate::knowledge::KnowledgeError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("classification failed: {0}")]
    ClassificationFailed(#[from] ClassifyError),

    #[error("retrieval failed: {0}")]
    RetrievalFailed(#[from] KnowledgeError),

    #[error("generation failed: {0}")]
    GenerationFailed(#[from] GenerateError),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::ClassificationFailed(_)
            | GatewayError::RetrievalFailed(_)
            | GatewayError::GenerationFailed(_)
            | GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
