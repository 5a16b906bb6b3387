//! Mini-app page handler.
//!
//! The front end is a prebuilt single page app read from `webapp_dir` at
//! request time, so redeploying the page needs no server restart. Assets
//! under `/static` are served by `ServeDir` in the router.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::instrument;

use crate::state::AppState;

/// `GET /`
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Response {
    let path = state.config().webapp_dir.join("index.html");

    match tokio::fs::read_to_string(&path).await {
        Ok(content) => Html(content).into_response(),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            tracing::error!(path = %path.display(), "index.html not found");
            (
                StatusCode::NOT_FOUND,
                Html("<h1>Mini App not found</h1>".to_string()),
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!(path = %path.display(), error = %error, "failed to read index.html");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Error loading Mini App</h1>".to_string()),
            )
                .into_response()
        }
    }
}
