//! Assistant chat endpoint tests.
//!
//! Only paths that never call the external generation API are exercised
//! here; generation success and failure shaping is unit tested against a
//! stub generator in the application crate.

use axum::http::StatusCode;
use bazaar_integration_tests::TestContext;
use bazaar_miniapp::services::recommender::CATALOG_NOT_READY_REPLY;
use serde_json::json;

#[tokio::test]
async fn test_chat_before_ingestion_answers_without_generation() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post_json(
            "/api/ai/chat",
            &json!({"user_id": 1, "message": "what teas do you have?"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["reply"], CATALOG_NOT_READY_REPLY);
    assert_eq!(body["recommended_products"], json!([]));
    assert_eq!(body["product_ids"], json!([]));
    assert_eq!(body["order_buttons_mode"], false);
}

#[tokio::test]
async fn test_chat_requires_user_id_and_message() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post_json("/api/ai/chat", &json!({"user_id": 1}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "user_id and message required");

    let (status, _) = ctx
        .post_json("/api/ai/chat", &json!({"message": "hello"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_rejects_blank_message() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post_json("/api/ai/chat", &json!({"user_id": 1, "message": "   "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
