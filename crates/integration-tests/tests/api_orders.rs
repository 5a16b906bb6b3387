//! Order endpoint tests.

use axum::http::StatusCode;
use bazaar_integration_tests::{
    TEST_DELIVERY_BASE_COST, TEST_FREE_DELIVERY_THRESHOLD, TestContext, sample_products,
};
use serde_json::json;

#[tokio::test]
async fn test_submit_totals_cart_adds_delivery_and_clears_cart() {
    let ctx = TestContext::new().await;
    ctx.seed_products(&sample_products()).await;

    // 2 x 1200 + 1 x 900 = 3300, below the free delivery threshold
    ctx.post_json(
        "/api/cart/add",
        &json!({"user_id": 1, "product_id": "tea-green", "quantity": 2}),
    )
    .await;
    ctx.post_json(
        "/api/cart/add",
        &json!({"user_id": 1, "product_id": "tea-black"}),
    )
    .await;

    let (status, body) = ctx
        .post_json(
            "/api/order",
            &json!({"user_id": 1, "order_data": {"address": "Main st 1", "phone": "+100"}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let order_id = body["order_id"].as_i64().expect("order_id");
    assert!(order_id > 0);

    let (_, cart_body) = ctx.get("/api/cart?user_id=1").await;
    assert_eq!(cart_body["cart"].as_array().expect("cart").len(), 0);

    let (_, orders_body) = ctx.get("/api/orders?user_id=1").await;
    let orders = orders_body["orders"].as_array().expect("orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], order_id);
    assert_eq!(orders[0]["total_amount"], 3300.0 + TEST_DELIVERY_BASE_COST);
    assert_eq!(orders[0]["status"], "new");
    assert_eq!(orders[0]["order_data"]["address"], "Main st 1");
}

#[tokio::test]
async fn test_submit_above_threshold_ships_free() {
    let ctx = TestContext::new().await;
    ctx.seed_products(&sample_products()).await;

    // 5 x 1200 = 6000, above the threshold
    ctx.post_json(
        "/api/cart/add",
        &json!({"user_id": 2, "product_id": "tea-green", "quantity": 5}),
    )
    .await;

    ctx.post_json("/api/order", &json!({"user_id": 2, "order_data": {}}))
        .await;

    let (_, body) = ctx.get("/api/orders?user_id=2").await;
    let total = body["orders"][0]["total_amount"].as_f64().expect("total");
    assert!(total >= TEST_FREE_DELIVERY_THRESHOLD);
    assert!((total - 6000.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_unpriced_and_unknown_lines_contribute_nothing() {
    let ctx = TestContext::new().await;
    ctx.seed_products(&sample_products()).await;

    ctx.post_json("/api/cart/add", &json!({"user_id": 3, "product_id": "mug"}))
        .await;
    ctx.post_json(
        "/api/cart/add",
        &json!({"user_id": 3, "product_id": "discontinued"}),
    )
    .await;
    ctx.post_json(
        "/api/cart/add",
        &json!({"user_id": 3, "product_id": "tea-black"}),
    )
    .await;

    ctx.post_json("/api/order", &json!({"user_id": 3, "order_data": {}}))
        .await;

    let (_, body) = ctx.get("/api/orders?user_id=3").await;
    assert_eq!(
        body["orders"][0]["total_amount"],
        900.0 + TEST_DELIVERY_BASE_COST
    );
}

#[tokio::test]
async fn test_orders_listed_newest_first() {
    let ctx = TestContext::new().await;
    ctx.seed_products(&sample_products()).await;

    for _ in 0..2 {
        ctx.post_json(
            "/api/cart/add",
            &json!({"user_id": 4, "product_id": "tea-black"}),
        )
        .await;
        ctx.post_json("/api/order", &json!({"user_id": 4, "order_data": {}}))
            .await;
    }

    let (_, body) = ctx.get("/api/orders?user_id=4").await;
    let orders = body["orders"].as_array().expect("orders");
    assert_eq!(orders.len(), 2);
    let first = orders[0]["id"].as_i64().expect("id");
    let second = orders[1]["id"].as_i64().expect("id");
    assert!(first > second);
}

#[tokio::test]
async fn test_orders_for_unknown_user_is_empty() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/api/orders?user_id=999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["orders"].as_array().expect("orders").len(), 0);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_submit_requires_user_and_order_data() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.post_json("/api/order", &json!({"user_id": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user_id and order_data required");
}

#[tokio::test]
async fn test_orders_requires_user_id() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/api/orders").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user_id required");
}
