//! Claude-backed recommendations.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use satchel_integration_tests::{FakeCompletion, TestApp};

fn ids(products: &Value) -> Vec<String> {
    products
        .as_array()
        .unwrap()
        .iter()
        .map(|product| product["id"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn test_reply_matches_catalog_names_in_catalog_order() {
    let mut app = TestApp::builder()
        .completion(FakeCompletion::replying(
            "Heritage Satchel, classic leather tote, Unknown Bag",
        ))
        .build();

    let response = app
        .post("/api/recommendations", &json!({ "preferences": "brown leather" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body["products"]), ["1", "5"]);
}

#[tokio::test]
async fn test_prompt_carries_history_and_preferences() {
    let mut app = TestApp::builder()
        .completion(FakeCompletion::replying(""))
        .build();
    app.get("/api/products/3").await;
    app.get("/api/products/8").await;

    let response = app
        .post("/api/recommendations", &json!({ "preferences": "minimalist" }))
        .await;
    assert_eq!(response.body["products"], json!([]));

    let prompts = app.completion.as_ref().unwrap().prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Browsing History: 8, 3"));
    assert!(prompts[0].contains("Preferences: minimalist"));
    assert!(prompts[0].contains("- Riviera Woven Hobo"));
}

#[tokio::test]
async fn test_without_backend_returns_empty_list() {
    let mut app = TestApp::new();

    let response = app.post("/api/recommendations", &json!({})).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["products"], json!([]));
}

#[tokio::test]
async fn test_failed_completion_returns_empty_list() {
    let mut app = TestApp::builder()
        .completion(FakeCompletion::default())
        .build();

    let response = app
        .post("/api/recommendations", &json!({ "preferences": "red" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["products"], json!([]));
    assert_eq!(app.completion.as_ref().unwrap().prompts().len(), 1);
}
