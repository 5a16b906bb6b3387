//! JSON envelope enforcement for the `/api/*` surface.
//!
//! API clients expect every response body to be JSON, including router-level
//! failures like unknown endpoints. Plain-text errors produced outside the
//! handlers are rewritten into the standard `{"success": false, "error"}`
//! envelope, and successful bodies that forgot a content type get one.

use axum::{
    Json,
    extract::Request,
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Coerce `/api/*` responses to JSON; pass everything else through.
pub async fn api_json_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if !path.starts_with("/api/") {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let response = next.run(request).await;
    let status = response.status();
    tracing::debug!(%method, %path, status = %status, "api request");

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if is_json {
        return response;
    }

    if status.is_client_error() || status.is_server_error() {
        let message = if status == StatusCode::NOT_FOUND {
            format!("API endpoint not found: {method} {path}")
        } else {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        };
        return (status, Json(json!({ "success": false, "error": message }))).into_response();
    }

    let mut response = response;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    response
}
