//! Order route handlers.
//!
//! Order totals are computed server side from the cart and the current
//! catalog snapshot. Client-supplied `order_data` is stored verbatim for
//! the owner to read but never trusted for pricing.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use bazaar_core::UserId;

use crate::db::{CartRepository, OrderRepository, PRODUCTS_KEY, SnapshotRepository};
use crate::error::{AppError, Result};
use crate::services::delivery_cost;
use crate::state::AppState;

/// How many past orders a user can page back through.
const ORDER_HISTORY_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct SubmitOrderRequest {
    user_id: Option<UserId>,
    order_data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    user_id: Option<UserId>,
}

/// `POST /api/order`
///
/// Lines whose product is missing from the snapshot or has an unparsable
/// price contribute nothing to the total.
#[instrument(skip(state, request))]
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitOrderRequest>,
) -> Result<Json<Value>> {
    let (Some(user_id), Some(order_data)) = (request.user_id, request.order_data) else {
        return Err(AppError::BadRequest(
            "user_id and order_data required".to_string(),
        ));
    };

    let cart_repo = CartRepository::new(state.pool());
    let items = cart_repo.list(user_id).await?;

    let products = SnapshotRepository::new(state.pool())
        .read(PRODUCTS_KEY)
        .await?
        .unwrap_or_default();
    let index = super::cart::index_by_key(&products);

    let mut subtotal = 0.0_f64;
    for (product_id, quantity) in &items {
        if let Some(price) = index
            .get(product_id.as_str())
            .and_then(|product| super::cart::value_price(product))
        {
            #[allow(clippy::cast_precision_loss)]
            {
                subtotal += price * *quantity as f64;
            }
        }
    }

    let total = subtotal + delivery_cost(&state.config().delivery, subtotal);

    let order_id = OrderRepository::new(state.pool())
        .save(user_id, &order_data, total)
        .await?;
    cart_repo.clear(user_id).await?;

    tracing::info!(%user_id, %order_id, total, "order submitted");

    Ok(Json(json!({ "success": true, "order_id": order_id })))
}

/// `GET /api/orders?user_id=`
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Value>> {
    let user_id = query
        .user_id
        .ok_or_else(|| AppError::BadRequest("user_id required".to_string()))?;

    let orders = OrderRepository::new(state.pool())
        .recent(user_id, ORDER_HISTORY_LIMIT)
        .await?;

    let orders: Vec<Value> = orders
        .into_iter()
        .map(|order| {
            json!({
                "id": order.id,
                "total_amount": order.total_amount,
                "status": order.status,
                "created_at": order.created_at,
                "order_data": order.order_data,
            })
        })
        .collect();

    Ok(Json(json!({ "success": true, "orders": orders })))
}
