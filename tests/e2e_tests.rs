//! End-to-end HTTP tests over the full router with all-stub pipelines.

use std::sync::Arc;

use axum::{Router, body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use uplift::classify::{ClassifyConfig, ZeroShotClassifier};
use uplift::embedding::{EmbedConfig, SentenceEmbedder};
use uplift::gateway::{AppState, create_router_with_state};
use uplift::generate::{GenConfig, TextGenerator};
use uplift::knowledge::KnowledgeBase;

fn stub_router() -> Router {
    let embedder = SentenceEmbedder::load(EmbedConfig::stub()).expect("stub embedder");
    let kb = KnowledgeBase::with_builtin_catalog(embedder).expect("knowledge base");
    let classifier = ZeroShotClassifier::load(ClassifyConfig::stub()).expect("stub classifier");
    let generator = TextGenerator::new(GenConfig::stub()).expect("stub generator");

    create_router_with_state(AppState::new(
        Arc::new(kb),
        Arc::new(classifier),
        Arc::new(generator),
    ))
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
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

#[tokio::test]
async fn test_root_lists_every_category_label() {
    let (status, body) = get_json(stub_router(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let labels = body["labels"].as_object().unwrap();
    assert_eq!(labels.len(), 6);
    assert_eq!(labels["sdg2"], "Zero Hunger");
    assert_eq!(labels["sdg7"], "Affordable and Clean Energy");
    assert_eq!(labels["sdg11"], "Sustainable Cities and Communities");
}

#[tokio::test]
async fn test_health_and_readiness() {
    let (status, body) = get_json(stub_router(), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get_json(stub_router(), "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["http"], "ready");
}

#[tokio::test]
async fn test_water_query_surfaces_the_water_purifier() {
    // The reference scenario: an unfiltered water query guesses the clean
    // water category and the purifier item tops the list.
    let (status, body) = post_json(
        stub_router(),
        "/recommendations",
        serde_json::json!({"query": "need clean drinking water for village"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["id"], "p4");
    assert_eq!(items[0]["title"], "Solar Water Purifiers");
}

#[tokio::test]
async fn test_energy_filter_overrides_the_guess() {
    // Same query, explicit sdg7: only the microgrid item can keep a nonzero
    // score, whatever the raw similarities say.
    let (_, body) = post_json(
        stub_router(),
        "/recommendations",
        serde_json::json!({
            "query": "need clean drinking water for village",
            "category": "sdg7",
            "top_k": 6
        }),
    )
    .await;

    for item in body.as_array().unwrap() {
        if item["score"].as_f64().unwrap() > 0.0 {
            assert_eq!(item["id"], "p5");
        }
    }
}

#[tokio::test]
async fn test_recommendations_carry_the_full_response_shape() {
    let (_, body) = post_json(
        stub_router(),
        "/recommendations",
        serde_json::json!({"query": "tablet classrooms for rural schools", "top_k": 2}),
    )
    .await;

    for item in body.as_array().unwrap() {
        assert!(item["id"].is_string());
        assert!(item["title"].is_string());
        assert!(item["description"].is_string());
        assert!(item["score"].is_number());
        assert_eq!(item["resources"].as_array().unwrap().len(), 3);
        assert_eq!(item["timeline"], "2-4 months");

        let confidence = item["confidence"].as_f64().unwrap();
        assert!((0.5..=0.99).contains(&confidence));
    }
}

#[tokio::test]
async fn test_analyze_round_trip() {
    let (status, body) = post_json(
        stub_router(),
        "/analyze",
        serde_json::json!({"text": "community compost pilots in three wards"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(["high impact", "medium impact", "low impact"]
        .contains(&body["label"].as_str().unwrap()));
    assert!(body["score"].as_f64().unwrap() <= 1.0);
    assert_eq!(body["insights"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _) = post_json(
        stub_router(),
        "/no-such-route",
        serde_json::json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
