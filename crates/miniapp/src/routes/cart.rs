//! Cart route handlers.
//!
//! The cart stores bare `(product_id, quantity)` pairs; reads enrich each
//! line with the raw catalog entry and a computed subtotal so the front end
//! renders straight from one response.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use bazaar_core::{ProductKey, UserId, parse_price};

use crate::db::{CartRepository, PRODUCTS_KEY, SnapshotRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    user_id: Option<UserId>,
    product_id: Option<ProductKey>,
    quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    user_id: Option<UserId>,
    product_id: Option<ProductKey>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    user_id: Option<UserId>,
    product_id: Option<ProductKey>,
    quantity: Option<i64>,
}

/// `GET /api/cart?user_id=`
///
/// Lines referencing products missing from the snapshot are kept with a
/// `null` product so the front end can show them instead of silently
/// shrinking the cart.
#[instrument(skip(state))]
pub async fn get_cart(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> Result<Json<Value>> {
    let user_id = query
        .user_id
        .ok_or_else(|| AppError::BadRequest("user_id required".to_string()))?;

    let items = CartRepository::new(state.pool()).list(user_id).await?;
    let products = SnapshotRepository::new(state.pool())
        .read(PRODUCTS_KEY)
        .await?
        .unwrap_or_default();

    let index = index_by_key(&products);

    let mut lines = Vec::with_capacity(items.len());
    let mut total = 0.0_f64;
    for (product_id, quantity) in items {
        let product = index.get(product_id.as_str());
        #[allow(clippy::cast_precision_loss)]
        let subtotal = product
            .and_then(|p| value_price(p))
            .map_or(0.0, |price| price * quantity as f64);
        total += subtotal;

        lines.push(json!({
            "product_id": product_id,
            "quantity": quantity,
            "product": product.copied().cloned(),
            "subtotal": subtotal,
        }));
    }

    Ok(Json(json!({
        "success": true,
        "cart": lines,
        "total": total,
    })))
}

/// `POST /api/cart/add`
///
/// Adding a quantity of N is N single-unit increments, so concurrent adds
/// merge instead of overwriting each other.
#[instrument(skip(state, request))]
pub async fn add(
    State(state): State<AppState>,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<Value>> {
    let (Some(user_id), Some(product_id)) = (request.user_id, request.product_id) else {
        return Err(AppError::BadRequest(
            "user_id and product_id required".to_string(),
        ));
    };

    let repo = CartRepository::new(state.pool());
    let key = product_id.as_key();
    for _ in 0..request.quantity.unwrap_or(1).max(0) {
        repo.add(user_id, &key).await?;
    }

    Ok(Json(json!({ "success": true })))
}

/// `POST /api/cart/remove`
#[instrument(skip(state, request))]
pub async fn remove(
    State(state): State<AppState>,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<Value>> {
    let (Some(user_id), Some(product_id)) = (request.user_id, request.product_id) else {
        return Err(AppError::BadRequest(
            "user_id and product_id required".to_string(),
        ));
    };

    CartRepository::new(state.pool())
        .remove(user_id, &product_id.as_key())
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// `POST /api/cart/update`
#[instrument(skip(state, request))]
pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<Value>> {
    let (Some(user_id), Some(product_id), Some(quantity)) =
        (request.user_id, request.product_id, request.quantity)
    else {
        return Err(AppError::BadRequest(
            "user_id, product_id and quantity required".to_string(),
        ));
    };

    CartRepository::new(state.pool())
        .set_quantity(user_id, &product_id.as_key(), quantity)
        .await?;

    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// Snapshot Value Helpers
// =============================================================================

/// Index raw catalog entries by their canonical string key.
pub(crate) fn index_by_key(products: &[Value]) -> std::collections::HashMap<String, &Value> {
    products
        .iter()
        .filter_map(|product| value_key(product).map(|key| (key, product)))
        .collect()
}

/// Canonical string key of a raw catalog entry.
pub(crate) fn value_key(product: &Value) -> Option<String> {
    match product.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Price of a raw catalog entry, if it parses.
pub(crate) fn value_price(product: &Value) -> Option<f64> {
    match product.get("price")? {
        Value::String(s) => parse_price(s),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
