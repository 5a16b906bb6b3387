//! HTTP middleware stack for the mini-app backend.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (wide open so the embedded web app can call from any origin)
//! 4. API JSON envelope (every `/api/*` response is JSON)

pub mod api_json;
pub mod cors;

pub use api_json::api_json_middleware;
pub use cors::cors_layer;
