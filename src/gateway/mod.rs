//! HTTP gateway (Axum) for the recommendation and analysis endpoints.
//!
//! This module is primarily used by the `uplift` server binary.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{analyze_handler, recommendations_handler, root_handler};
pub use state::AppState;

/// Component status value used by the readiness endpoint.
pub const STATUS_READY: &str = "ready";
/// Component status value for a failed component.
pub const STATUS_ERROR: &str = "error";

pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/recommendations", post(recommendations_handler))
        .route("/analyze", post(analyze_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub knowledge_base: &'static str,
    pub embedder_mode: &'static str,
    pub classifier_mode: &'static str,
    pub generator_mode: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let knowledge_base = if state.kb.is_empty() {
        STATUS_ERROR
    } else {
        STATUS_READY
    };

    let mode = |is_stub: bool| if is_stub { "stub" } else { "real" };

    let components = ComponentStatus {
        http: STATUS_READY,
        knowledge_base,
        embedder_mode: mode(state.kb.embedder().is_stub()),
        classifier_mode: mode(state.classifier.is_stub()),
        generator_mode: mode(state.generator.is_stub()),
    };

    let is_ready = components.knowledge_base == STATUS_READY;

    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready { "ok" } else { "pending" };

    (
        status_code,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
