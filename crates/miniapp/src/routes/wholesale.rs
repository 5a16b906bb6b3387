//! Wholesale request handler.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use bazaar_core::UserId;

use crate::db::WholesaleRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WholesaleRequest {
    user_id: Option<UserId>,
    name: Option<String>,
    contact: Option<String>,
    question: Option<String>,
}

/// `POST /api/wholesale`
///
/// The owner notification is fire and forget. The request is already
/// persisted, so a Telegram outage must not fail the submission.
#[instrument(skip(state, request))]
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<WholesaleRequest>,
) -> Result<Json<Value>> {
    let (Some(user_id), Some(name), Some(contact), Some(question)) = (
        request.user_id,
        non_empty(request.name),
        non_empty(request.contact),
        non_empty(request.question),
    ) else {
        return Err(AppError::BadRequest("All fields required".to_string()));
    };

    let request_id = WholesaleRepository::new(state.pool())
        .save(user_id, &name, &contact, &question)
        .await?;

    tracing::info!(%user_id, %request_id, "wholesale request saved");

    let notifier = state.notifier().clone();
    tokio::spawn(async move {
        if let Err(error) = notifier
            .notify_wholesale(request_id, user_id, &name, &contact, &question)
            .await
        {
            tracing::error!(%request_id, error = %error, "owner notification failed");
        }
    });

    Ok(Json(json!({ "success": true, "request_id": request_id })))
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_rejects_blank_strings() {
        assert_eq!(non_empty(Some("Ann".to_string())).as_deref(), Some("Ann"));
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(None), None);
    }
}
