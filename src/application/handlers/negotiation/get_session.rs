//! GetSessionHandler - Read-only view of a negotiation session.

use std::sync::Arc;

use crate::domain::foundation::{Money, SessionId, Timestamp};
use crate::domain::negotiation::{HardshipStatus, InstallmentSchedule, NegotiationPhase};
use crate::ports::{SessionStore, SessionStoreError};

/// Query for a session view.
#[derive(Debug, Clone)]
pub struct GetSessionQuery {
    pub session_id: SessionId,
}

/// Read-only projection of session state.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub id: SessionId,
    pub total_debt: Money,
    pub phase: NegotiationPhase,
    pub hardship: HardshipStatus,
    pub income_monthly: Option<Money>,
    pub offered_term: Option<u32>,
    pub final_schedule: Option<InstallmentSchedule>,
    pub turn_count: u32,
    pub agreement_reached: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Error type for session queries.
#[derive(Debug, thiserror::Error)]
pub enum GetSessionError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for GetSessionError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => GetSessionError::NotFound(id),
            other => GetSessionError::Storage(other.to_string()),
        }
    }
}

/// Handler for session views.
pub struct GetSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl GetSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetSessionQuery) -> Result<SessionView, GetSessionError> {
        let session = self.store.load(query.session_id).await?;

        Ok(SessionView {
            id: session.id(),
            total_debt: session.debt(),
            phase: session.phase(),
            hardship: session.hardship(),
            income_monthly: session.income().map(|i| i.monthly),
            offered_term: session.offered_term(),
            final_schedule: session.final_schedule().copied(),
            turn_count: session.turn_count(),
            agreement_reached: session.is_completed(),
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::negotiation::NegotiationSession;

    #[tokio::test]
    async fn projects_session_state() {
        let store = Arc::new(InMemorySessionStore::new());
        let mut session = NegotiationSession::new(Money::from_dollars(2400)).unwrap();
        session.note_offer(6);
        store.save(&session).await.unwrap();

        let handler = GetSessionHandler::new(store);
        let view = handler
            .handle(GetSessionQuery {
                session_id: session.id(),
            })
            .await
            .unwrap();

        assert_eq!(view.total_debt, Money::from_dollars(2400));
        assert_eq!(view.phase, NegotiationPhase::Initial);
        assert_eq!(view.offered_term, Some(6));
        assert!(!view.agreement_reached);
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let store = Arc::new(InMemorySessionStore::new());
        let handler = GetSessionHandler::new(store);

        let result = handler
            .handle(GetSessionQuery {
                session_id: SessionId::new(),
            })
            .await;

        assert!(matches!(result, Err(GetSessionError::NotFound(_))));
    }
}
