//! Catalog snapshot handlers.
//!
//! Products and categories are served straight from the `catalog_cache`
//! table as the ingestion job wrote them. A missing snapshot is a normal
//! state during startup, reported as `success: false` with an empty list
//! rather than an error status.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::{CATEGORIES_KEY, PRODUCTS_KEY, SnapshotRepository};
use crate::error::Result;
use crate::state::AppState;

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn products(State(state): State<AppState>) -> Result<Json<Value>> {
    snapshot_response(&state, PRODUCTS_KEY, "products").await
}

/// `GET /api/categories`
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Value>> {
    snapshot_response(&state, CATEGORIES_KEY, "categories").await
}

/// Read a snapshot and wrap it in the standard envelope.
async fn snapshot_response(state: &AppState, key: &str, field: &str) -> Result<Json<Value>> {
    let repo = SnapshotRepository::new(state.pool());

    match repo.read(key).await? {
        Some(items) => {
            tracing::debug!(key, count = items.len(), "snapshot served");
            Ok(Json(json!({
                "success": true,
                field: items,
                "count": items.len(),
            })))
        }
        None => {
            tracing::warn!(key, "snapshot not yet ingested");
            Ok(Json(json!({
                "success": false,
                "error": format!(
                    "{} not found. Please wait for catalog to load.",
                    capitalize(field)
                ),
                field: [],
                "count": 0,
            })))
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("products"), "Products");
        assert_eq!(capitalize(""), "");
    }
}
