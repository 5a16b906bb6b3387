//! Integration tests for the Bazaar mini-app backend.
//!
//! Tests drive the complete router, layers included, against an in-memory
//! `SQLite` database. No server process or network is involved; requests go
//! through `tower::ServiceExt::oneshot`.
//!
//! Chat tests only exercise paths that never reach the external generation
//! API (empty catalog, validation failures); everything that needs a live
//! model is covered by unit tests against a stub generator in the
//! application crate.

#![allow(clippy::missing_panics_doc)]

use std::net::IpAddr;
use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header::CONTENT_TYPE};
use secrecy::SecretString;
use sqlx::SqlitePool;
use tower::ServiceExt;

use bazaar_core::ChatId;
use bazaar_miniapp::config::{
    AssistantConfig, DeliveryConfig, MiniAppConfig, TelegramConfig,
};
use bazaar_miniapp::db::{self, PRODUCTS_KEY, SnapshotRepository};
use bazaar_miniapp::state::AppState;

/// Flat delivery fee used by the test configuration.
pub const TEST_DELIVERY_BASE_COST: f64 = 300.0;

/// Free delivery threshold used by the test configuration.
pub const TEST_FREE_DELIVERY_THRESHOLD: f64 = 5000.0;

/// A fully wired application over an in-memory database.
pub struct TestContext {
    app: Router,
    pool: SqlitePool,
}

impl TestContext {
    /// Build the application with test configuration and empty tables.
    pub async fn new() -> Self {
        Self::with_webapp_dir(PathBuf::from("webapp")).await
    }

    /// Build the application serving front-end files from `webapp_dir`.
    pub async fn with_webapp_dir(webapp_dir: PathBuf) -> Self {
        let pool = db::create_memory_pool().await.expect("memory pool");
        let mut config = test_config();
        config.webapp_dir = webapp_dir;
        let state = AppState::new(config, pool.clone()).expect("app state");

        Self {
            app: bazaar_miniapp::app(state),
            pool,
        }
    }

    /// Direct access to the underlying pool for seeding and assertions.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Replace the product snapshot.
    pub async fn seed_products(&self, products: &[serde_json::Value]) {
        SnapshotRepository::new(&self.pool)
            .write(PRODUCTS_KEY, products)
            .await
            .expect("seed products");
    }

    /// Send a GET request and return status and parsed JSON body.
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        self.send(request).await
    }

    /// Send a POST request with a JSON body and return status and parsed body.
    pub async fn post_json(
        &self,
        uri: &str,
        body: &serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        self.send(request).await
    }

    /// Send an arbitrary request and return the raw response.
    pub async fn send_raw(&self, request: Request<Body>) -> axum::response::Response {
        self.app.clone().oneshot(request).await.expect("response")
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.send_raw(request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).expect("json body");
        (status, body)
    }
}

/// Configuration with dummy credentials; nothing in these tests sends
/// outbound traffic on the request path.
fn test_config() -> MiniAppConfig {
    MiniAppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".parse::<IpAddr>().expect("host"),
        port: 0,
        webapp_dir: PathBuf::from("webapp"),
        assistant: AssistantConfig {
            api_key: SecretString::from("test-not-a-real-credential"),
            model: "claude-3-5-haiku-latest".to_string(),
            timeout_secs: 5,
            max_catalog_items: 100,
        },
        telegram: TelegramConfig {
            bot_token: SecretString::from("test-not-a-real-token"),
            owner_chat_id: ChatId::new(1),
        },
        delivery: DeliveryConfig {
            base_cost: TEST_DELIVERY_BASE_COST,
            free_threshold: TEST_FREE_DELIVERY_THRESHOLD,
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A small catalog used across tests.
#[must_use]
pub fn sample_products() -> Vec<serde_json::Value> {
    vec![
        serde_json::json!({
            "id": "tea-green",
            "name": "Green Tea",
            "price": "1200",
            "description": "Loose leaf green tea",
            "pictures": ["https://cdn.example/tea-green.jpg"],
        }),
        serde_json::json!({
            "id": "tea-black",
            "name": "Black Tea",
            "price": "900",
            "description": "Strong morning blend",
            "pictures": [],
        }),
        serde_json::json!({
            "id": "mug",
            "name": "Ceramic Mug",
            "price": "not priced yet",
            "description": "Hand made mug",
            "pictures": [],
        }),
    ]
}
