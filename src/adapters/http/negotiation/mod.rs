//! HTTP surface for the negotiation session boundary.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::NegotiationHandlers;
pub use routes::negotiation_routes;
