//! HTTP route handlers for the mini-app backend.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Mini-app index page
//! GET  /static/*                - Static assets (ServeDir, wired in lib.rs)
//! GET  /health                  - Health check
//! GET  /health/ready            - Readiness check (database ping)
//!
//! # Catalog
//! GET  /api/products            - Full product snapshot
//! GET  /api/categories          - Category snapshot
//! GET  /api/search?q=           - Substring search over products
//!
//! # Cart
//! GET  /api/cart?user_id=       - Enriched cart with totals
//! POST /api/cart/add            - Add product (optional quantity)
//! POST /api/cart/remove         - Remove product entirely
//! POST /api/cart/update         - Set quantity (0 removes)
//!
//! # Orders
//! POST /api/order               - Submit order, clears cart
//! GET  /api/orders?user_id=     - Recent orders, newest first
//!
//! # Assistant
//! POST /api/ai/chat             - Conversational product recommendations
//!
//! # Misc
//! GET  /api/faq                 - Static FAQ entries
//! POST /api/wholesale           - Wholesale request + owner notification
//! GET  /api/subscription?user_id= - Subscription status
//! POST /api/subscription/toggle - Flip subscription state
//! ```

pub mod cart;
pub mod catalog;
pub mod chat;
pub mod faq;
pub mod orders;
pub mod pages;
pub mod search;
pub mod subscription;
pub mod wholesale;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the `/api` sub-router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(catalog::products))
        .route("/categories", get(catalog::categories))
        .route("/search", get(search::search))
        .route("/cart", get(cart::get_cart))
        .route("/cart/add", post(cart::add))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/update", post(cart::update))
        .route("/order", post(orders::submit))
        .route("/orders", get(orders::list))
        .route("/ai/chat", post(chat::chat))
        .route("/faq", get(faq::faq))
        .route("/wholesale", post(wholesale::submit))
        .route("/subscription", get(subscription::status))
        .route("/subscription/toggle", post(subscription::toggle))
}

/// Create the complete application router (except cross-cutting layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api", api_routes())
        .route("/", get(pages::index))
}
