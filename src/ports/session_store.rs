//! Session Store Port - per-session state, scoped to the process.
//!
//! State never outlives a negotiation session, so implementations are
//! in-memory; the port exists so handlers stay storage-agnostic and
//! tests can substitute their own store.

use async_trait::async_trait;

use crate::domain::foundation::SessionId;
use crate::domain::negotiation::NegotiationSession;

/// Port for storing negotiation sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Saves a session, replacing any existing state for its id.
    async fn save(&self, session: &NegotiationSession) -> Result<(), SessionStoreError>;

    /// Loads a session by id.
    async fn load(&self, id: SessionId) -> Result<NegotiationSession, SessionStoreError>;

    /// Returns true if a session exists.
    async fn exists(&self, id: SessionId) -> Result<bool, SessionStoreError>;

    /// Removes a session.
    async fn delete(&self, id: SessionId) -> Result<(), SessionStoreError>;
}

/// Session store errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    #[error("storage failure: {0}")]
    Storage(String),
}
