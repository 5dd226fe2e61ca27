use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_top_k() -> usize {
    crate::constants::DEFAULT_TOP_K
}

/// Body of `POST /recommendations`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    /// Optional category filter (e.g. `sdg6`). Guessed from the query when
    /// absent.
    #[serde(default)]
    pub category: Option<String>,
    /// Number of results to return. Default: 3.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// One recommendation in the response list.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub score: f32,
    pub resources: Vec<String>,
    pub timeline: String,
    pub confidence: f32,
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

/// Response of `POST /analyze`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub label: String,
    pub score: f32,
    pub insights: Vec<String>,
}

/// Response of `GET /`.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub ok: bool,
    pub service: &'static str,
    pub labels: BTreeMap<&'static str, &'static str>,
}
