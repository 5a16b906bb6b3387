//! Subscription route handlers.
//!
//! Subscriptions drive broadcast notifications from the bot side; the
//! mini-app only exposes the status read and the toggle.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use bazaar_core::{ChatId, UserId};

use crate::db::SubscriptionRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    user_id: Option<UserId>,
    chat_id: Option<ChatId>,
    #[serde(default)]
    username: String,
}

/// `GET /api/subscription?user_id=`
#[instrument(skip(state))]
pub async fn status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Value>> {
    let user_id = query
        .user_id
        .ok_or_else(|| AppError::BadRequest("user_id required".to_string()))?;

    let subscribed = SubscriptionRepository::new(state.pool())
        .is_subscribed(user_id)
        .await?;

    Ok(Json(json!({ "success": true, "subscribed": subscribed })))
}

/// `POST /api/subscription/toggle`
#[instrument(skip(state, request))]
pub async fn toggle(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<Value>> {
    let (Some(user_id), Some(chat_id)) = (request.user_id, request.chat_id) else {
        return Err(AppError::BadRequest(
            "user_id and chat_id required".to_string(),
        ));
    };

    let repo = SubscriptionRepository::new(state.pool());
    let subscribed = if repo.is_subscribed(user_id).await? {
        repo.unsubscribe(user_id).await?;
        false
    } else {
        repo.subscribe(user_id, chat_id, &request.username).await?;
        true
    };

    tracing::info!(%user_id, subscribed, "subscription toggled");

    Ok(Json(json!({ "success": true, "subscribed": subscribed })))
}
