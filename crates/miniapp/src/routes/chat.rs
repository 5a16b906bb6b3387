//! Assistant chat handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use bazaar_core::UserId;

use crate::db::SnapshotRepository;
use crate::error::{AppError, Result};
use crate::services::{ChatTurn, GenerationFailure};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    user_id: Option<UserId>,
    message: Option<String>,
}

/// `POST /api/ai/chat`
///
/// Generation failures still answer with a complete chat payload so the
/// front end can render the friendly text in the conversation instead of
/// showing a bare error state. The raw upstream error is logged in the
/// recommender and never serialized.
#[instrument(skip(state, request))]
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response> {
    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    let Some(user_id) = request.user_id else {
        return Err(AppError::BadRequest(
            "user_id and message required".to_string(),
        ));
    };
    if message.is_empty() {
        return Err(AppError::BadRequest(
            "user_id and message required".to_string(),
        ));
    }

    tracing::info!(%user_id, message_len = message.len(), "chat turn requested");

    let catalog = SnapshotRepository::new(state.pool())
        .read_products()
        .await?
        .unwrap_or_default();

    match state.recommender().generate(message, &catalog).await {
        Ok(turn) => {
            tracing::info!(
                %user_id,
                recommended = turn.recommended_products.len(),
                "chat turn generated"
            );
            Ok(success_response(&turn))
        }
        Err(failure) => Ok(failure_response(&failure)),
    }
}

fn success_response(turn: &ChatTurn) -> Response {
    Json(json!({
        "success": true,
        "reply": turn.reply,
        "recommended_products": turn.recommended_products,
        "product_ids": turn.product_ids,
        "order_buttons_mode": turn.order_buttons_mode,
    }))
    .into_response()
}

fn failure_response(failure: &GenerationFailure) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": failure.message,
            "reply": failure.message,
            "recommended_products": [],
            "product_ids": [],
            "order_buttons_mode": false,
        })),
    )
        .into_response()
}
