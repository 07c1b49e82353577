//! HTTP routes for negotiation endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    get_session, process_turn, start_session, submit_documents, NegotiationHandlers,
};

/// Creates the negotiation router with all endpoints.
pub fn negotiation_routes(handlers: NegotiationHandlers) -> Router {
    Router::new()
        .route("/", post(start_session))
        .route("/:id", get(get_session))
        .route("/:id/turns", post(process_turn))
        .route("/:id/documents", post(submit_documents))
        .with_state(handlers)
}
