//! HTTP adapters: the axum surface over the application handlers.

pub mod negotiation;

use axum::{routing::get, Json, Router};

use negotiation::{negotiation_routes, NegotiationHandlers};

/// Builds the full API router.
pub fn api_router(handlers: NegotiationHandlers) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/sessions", negotiation_routes(handlers))
}

/// GET /health - liveness probe
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
