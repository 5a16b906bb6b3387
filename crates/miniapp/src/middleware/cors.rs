//! CORS configuration for the embedded web app.
//!
//! The mini-app front end is served from the chat client's webview, so the
//! effective origin varies by platform. The API is origin-agnostic and
//! carries no cookies, so a wildcard policy is safe here.

use std::time::Duration;

use axum::http::{Method, header::CONTENT_TYPE};
use tower_http::cors::{Any, CorsLayer};

/// Build the CORS layer applied to the whole router.
///
/// Preflight `OPTIONS` requests are answered by this layer directly and
/// never reach the handlers.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
