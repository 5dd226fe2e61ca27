use std::collections::{BTreeMap, HashMap};

use axum::{Json, extract::State};
use tracing::{debug, instrument};

use crate::constants::{
    ANALYZE_INSIGHTS, CONFIDENCE_CEILING, CONFIDENCE_FLOOR, DEFAULT_RESOURCES, DEFAULT_TIMELINE,
    IMPACT_LABELS, SERVICE_NAME,
};
use crate::knowledge::catalog;

use super::error::GatewayError;
use super::payload::{
    AnalyzeRequest, AnalyzeResponse, RecommendItem, RecommendRequest, RootResponse,
};
use super::state::AppState;

/// Service identity and category label map.
#[instrument(skip(_state))]
pub async fn root_handler(State(_state): State<AppState>) -> Json<RootResponse> {
    let labels: BTreeMap<&'static str, &'static str> =
        catalog::CATEGORY_LABELS.iter().copied().collect();

    Json(RootResponse {
        ok: true,
        service: SERVICE_NAME,
        labels,
    })
}

/// Classify the query, rank the catalog, and generate a plan per hit.
#[instrument(skip(state, request), fields(top_k = request.top_k))]
pub async fn recommendations_handler(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<Vec<RecommendItem>>, GatewayError> {
    // Intent scores against every category display name.
    let display_names: Vec<&str> = catalog::CATEGORY_LABELS
        .iter()
        .map(|(_, name)| *name)
        .collect();
    let label_scores = state
        .classifier
        .classify(&request.query, &display_names, true)?;
    let score_by_label: HashMap<&str, f32> = label_scores
        .iter()
        .map(|entry| (entry.label.as_str(), entry.score))
        .collect();

    // The filter is the caller's category, or else the best label mapped back
    // to its id.
    let guessed_category: Option<String> = match &request.category {
        Some(category) => Some(category.clone()),
        None => label_scores
            .first()
            .and_then(|top| catalog::category_for_display_name(&top.label))
            .map(str::to_string),
    };

    debug!(
        category = guessed_category.as_deref().unwrap_or("<none>"),
        requested = request.category.is_some(),
        "Resolved category filter"
    );

    let hits = state
        .kb
        .search(&request.query, guessed_category.as_deref(), request.top_k)?;

    let guessed_label_score = guessed_category
        .as_deref()
        .and_then(catalog::display_name)
        .and_then(|name| score_by_label.get(name).copied())
        .unwrap_or(0.0);

    let mut items = Vec::with_capacity(hits.len());
    for hit in hits {
        let prompt = format!(
            "Suggest next steps for '{}' in context: {}\nPlan:",
            hit.item.title, request.query
        );
        let generated = state.generator.generate(&prompt).await?;

        // Keep only the continuation after the prompt's trailing marker.
        let description = generated
            .split_once("Plan:")
            .map(|(_, rest)| rest)
            .unwrap_or(&generated)
            .trim()
            .to_string();

        let confidence =
            (hit.score + guessed_label_score).clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING);

        items.push(RecommendItem {
            id: hit.item.id,
            title: hit.item.title,
            description,
            score: round4(hit.score),
            resources: DEFAULT_RESOURCES.iter().map(|r| r.to_string()).collect(),
            timeline: DEFAULT_TIMELINE.to_string(),
            confidence,
        });
    }

    Ok(Json(items))
}

/// Score free text against the fixed impact labels.
#[instrument(skip(state, request))]
pub async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, GatewayError> {
    let scored = state.classifier.classify(&request.text, IMPACT_LABELS, false)?;

    let top = scored.into_iter().next().ok_or_else(|| {
        GatewayError::InternalError("classifier returned no labels".to_string())
    })?;

    Ok(Json(AnalyzeResponse {
        label: top.label,
        score: top.score,
        insights: ANALYZE_INSIGHTS.iter().map(|s| s.to_string()).collect(),
    }))
}

fn round4(score: f32) -> f32 {
    (score * 10_000.0).round() / 10_000.0
}
