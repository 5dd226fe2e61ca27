//! Handler tests over the full router with all-stub pipelines.

use std::sync::Arc;

use axum::{Router, body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::classify::{ClassifyConfig, ZeroShotClassifier};
use crate::constants::{ANALYZE_INSIGHTS, IMPACT_LABELS};
use crate::embedding::{EmbedConfig, SentenceEmbedder};
use crate::gateway::{AppState, create_router_with_state};
use crate::generate::{GenConfig, TextGenerator};
use crate::knowledge::KnowledgeBase;

/// Builds a state with every pipeline in stub mode.
fn stub_state() -> AppState {
    let embedder = SentenceEmbedder::load(EmbedConfig::stub()).expect("stub embedder");
    let kb = KnowledgeBase::with_builtin_catalog(embedder).expect("knowledge base");
    let classifier = ZeroShotClassifier::load(ClassifyConfig::stub()).expect("stub classifier");
    let generator = TextGenerator::new(GenConfig::stub()).expect("stub generator");

    AppState::new(Arc::new(kb), Arc::new(classifier), Arc::new(generator))
}

fn test_router() -> Router {
    create_router_with_state(stub_state())
}

async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

async fn post_json(
    router: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

mod root_tests {
    use super::*;

    #[tokio::test]
    async fn test_root_reports_identity_and_labels() {
        let (status, body) = get(test_router(), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["service"], "uplift");
        assert_eq!(body["labels"]["sdg6"], "Clean Water and Sanitation");
        assert_eq!(body["labels"].as_object().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_healthz_is_ok() {
        let (status, body) = get(test_router(), "/healthz").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_ready_reports_stub_modes() {
        let (status, body) = get(test_router(), "/ready").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["components"]["knowledge_base"], "ready");
        assert_eq!(body["components"]["embedder_mode"], "stub");
        assert_eq!(body["components"]["classifier_mode"], "stub");
        assert_eq!(body["components"]["generator_mode"], "stub");
    }
}

mod recommendations_tests {
    use super::*;

    #[tokio::test]
    async fn test_default_top_k_is_three() {
        let (status, body) = post_json(
            test_router(),
            "/recommendations",
            serde_json::json!({"query": "community projects"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_water_query_guesses_water_category() {
        let (status, body) = post_json(
            test_router(),
            "/recommendations",
            serde_json::json!({"query": "need clean drinking water for village"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items[0]["id"], "p4");
        assert_eq!(items[0]["title"], "Solar Water Purifiers");
        assert!(items[0]["score"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_explicit_category_restricts_the_top_hit() {
        let (status, body) = post_json(
            test_router(),
            "/recommendations",
            serde_json::json!({
                "query": "prepaid smart meters for a community microgrid",
                "category": "sdg7"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items[0]["id"], "p5");
        assert!(items[0]["score"].as_f64().unwrap() > 0.0);

        // Masking, not exclusion: the tail is zero-scored off-category fill.
        for item in &items[1..] {
            assert_eq!(item["score"].as_f64().unwrap(), 0.0);
        }
    }

    #[tokio::test]
    async fn test_scores_are_sorted_descending() {
        let (_, body) = post_json(
            test_router(),
            "/recommendations",
            serde_json::json!({"query": "solar water purifiers", "top_k": 6}),
        )
        .await;

        let scores: Vec<f64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["score"].as_f64().unwrap())
            .collect();

        for pair in scores.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[tokio::test]
    async fn test_top_k_larger_than_catalog_returns_all() {
        let (_, body) = post_json(
            test_router(),
            "/recommendations",
            serde_json::json!({"query": "community projects", "top_k": 50}),
        )
        .await;

        assert_eq!(body.as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_top_k_zero_returns_nothing() {
        let (status, body) = post_json(
            test_router(),
            "/recommendations",
            serde_json::json!({"query": "community projects", "top_k": 0}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confidence_stays_within_bounds() {
        for query in [
            "need clean drinking water for village",
            "solar microgrid with prepaid smart meters",
            "completely unrelated text about nothing",
            "",
        ] {
            let (_, body) = post_json(
                test_router(),
                "/recommendations",
                serde_json::json!({"query": query, "top_k": 6}),
            )
            .await;

            for item in body.as_array().unwrap() {
                let confidence = item["confidence"].as_f64().unwrap();
                assert!(
                    (0.5..=0.99).contains(&confidence),
                    "confidence {confidence} out of bounds for query {query:?}"
                );
            }
        }
    }

    #[tokio::test]
    async fn test_description_drops_the_prompt_prefix() {
        let (_, body) = post_json(
            test_router(),
            "/recommendations",
            serde_json::json!({"query": "need clean drinking water for village", "top_k": 1}),
        )
        .await;

        let description = body[0]["description"].as_str().unwrap();
        assert!(!description.is_empty());
        assert!(!description.contains("Suggest next steps"));
        assert!(!description.starts_with("Plan:"));
    }

    #[tokio::test]
    async fn test_fixed_resources_and_timeline() {
        let (_, body) = post_json(
            test_router(),
            "/recommendations",
            serde_json::json!({"query": "village grain storage", "top_k": 1}),
        )
        .await;

        let item = &body[0];
        assert_eq!(
            item["resources"],
            serde_json::json!(["Local Partners", "Community Org", "Mobile App"])
        );
        assert_eq!(item["timeline"], "2-4 months");
    }

    #[tokio::test]
    async fn test_missing_query_is_a_client_error() {
        let (status, _) = post_json(
            test_router(),
            "/recommendations",
            serde_json::json!({"top_k": 3}),
        )
        .await;

        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_client_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/recommendations")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
    }
}

mod analyze_tests {
    use super::*;

    #[tokio::test]
    async fn test_analyze_returns_label_score_and_insights() {
        let (status, body) = post_json(
            test_router(),
            "/analyze",
            serde_json::json!({"text": "pilot a waste segregation program"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);

        let label = body["label"].as_str().unwrap();
        assert!(IMPACT_LABELS.contains(&label));

        let score = body["score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score));

        let insights: Vec<&str> = body["insights"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(insights, ANALYZE_INSIGHTS);
    }

    #[tokio::test]
    async fn test_analyze_is_deterministic() {
        let body = serde_json::json!({"text": "expand mobile health vans"});

        let (_, first) = post_json(test_router(), "/analyze", body.clone()).await;
        let (_, second) = post_json(test_router(), "/analyze", body).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_analyze_missing_text_is_a_client_error() {
        let (status, _) = post_json(test_router(), "/analyze", serde_json::json!({})).await;
        assert!(status.is_client_error());
    }
}
