//! Product search handler.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::{PRODUCTS_KEY, SnapshotRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

/// `GET /api/search?q=`
///
/// Case-insensitive substring match over product names and descriptions.
/// Good enough for a catalog that fits in one cache row; a real search
/// index would be overkill here.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let needle = query.q.as_deref().map(str::trim).unwrap_or_default();
    if needle.is_empty() {
        return Err(AppError::BadRequest("Query required".to_string()));
    }

    let Some(products) = SnapshotRepository::new(state.pool())
        .read(PRODUCTS_KEY)
        .await?
    else {
        return Ok(Json(json!({
            "success": false,
            "error": "Products not found. Please wait for catalog to load.",
            "products": [],
            "count": 0,
        })));
    };

    let needle = needle.to_lowercase();
    let matched: Vec<&Value> = products
        .iter()
        .filter(|product| {
            field_contains(product, "name", &needle)
                || field_contains(product, "description", &needle)
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "products": matched,
        "count": matched.len(),
    })))
}

/// Whether a string field of a raw catalog entry contains `needle`.
fn field_contains(product: &Value, field: &str, needle: &str) -> bool {
    product
        .get(field)
        .and_then(Value::as_str)
        .is_some_and(|text| text.to_lowercase().contains(needle))
}
