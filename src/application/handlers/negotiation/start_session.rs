//! StartSessionHandler - Open a negotiation session for a fixed debt.

use std::sync::Arc;

use crate::domain::foundation::{Money, SessionId};
use crate::domain::negotiation::{NegotiationSession, SessionError};
use crate::ports::{SessionStore, SessionStoreError};

/// Command to open a new session.
#[derive(Debug, Clone)]
pub struct StartSessionCommand {
    pub total_debt: Money,
}

/// Result of opening a session.
#[derive(Debug, Clone)]
pub struct StartSessionResult {
    pub session_id: SessionId,
    pub greeting: String,
}

/// Error type for session creation.
#[derive(Debug, thiserror::Error)]
pub enum StartSessionError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for StartSessionError {
    fn from(err: SessionStoreError) -> Self {
        StartSessionError::Storage(err.to_string())
    }
}

/// Handler for opening sessions.
pub struct StartSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl StartSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Opens a session and records the opening question.
    ///
    /// A non-positive debt aborts creation; it is the only input the
    /// service refuses outright.
    pub async fn handle(
        &self,
        cmd: StartSessionCommand,
    ) -> Result<StartSessionResult, StartSessionError> {
        let mut session = NegotiationSession::new(cmd.total_debt)?;

        let greeting = format!(
            "Hello! I'm here to help you settle your balance of {}. \
             Are you able to pay it in full today?",
            session.debt()
        );
        session.record_assistant_message(&greeting);

        self.store.save(&session).await?;

        tracing::info!(session_id = %session.id(), debt = %session.debt(), "session opened");

        Ok(StartSessionResult {
            session_id: session.id(),
            greeting,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySessionStore;

    fn handler_with_store() -> (StartSessionHandler, Arc<InMemorySessionStore>) {
        let store = Arc::new(InMemorySessionStore::new());
        (StartSessionHandler::new(store.clone()), store)
    }

    #[tokio::test]
    async fn opens_session_and_greets_with_the_debt() {
        let (handler, store) = handler_with_store();

        let result = handler
            .handle(StartSessionCommand {
                total_debt: Money::from_dollars(2400),
            })
            .await
            .unwrap();

        assert!(result.greeting.contains("$2400.00"));

        let session = store.load(result.session_id).await.unwrap();
        assert_eq!(session.history().len(), 1);
        assert!(!session.is_completed());
    }

    #[tokio::test]
    async fn rejects_non_positive_debt() {
        let (handler, store) = handler_with_store();

        let result = handler
            .handle(StartSessionCommand {
                total_debt: Money::ZERO,
            })
            .await;

        assert!(matches!(
            result,
            Err(StartSessionError::Session(SessionError::InvalidDebt { .. }))
        ));
        assert_eq!(store.session_count().await, 0);
    }
}
