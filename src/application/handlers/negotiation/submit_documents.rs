//! SubmitDocumentsHandler - Run one hardship document batch through the
//! classifier and the gate.
//!
//! A batch is one atomic gate transition: every document is classified
//! first, then a single status change is applied. The classifier
//! failing or timing out counts as a rejection with a generic reason;
//! review is never left pending.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::SessionId;
use crate::domain::negotiation::{
    HardshipDocument, HardshipGate, HardshipStatus, NegotiationPolicy, ReviewOutcome,
};
use crate::ports::{DocumentClassifier, SessionStore, SessionStoreError};

/// Command to submit a batch of hardship documents.
#[derive(Debug, Clone)]
pub struct SubmitDocumentsCommand {
    pub session_id: SessionId,
    pub documents: Vec<HardshipDocument>,
}

/// Result of a batch submission.
#[derive(Debug, Clone)]
pub struct SubmitDocumentsResult {
    pub hardship: HardshipStatus,
    /// Reason label of the decisive classification, if any.
    pub reason_label: Option<String>,
}

/// Error type for document submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitDocumentsError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("no documents in batch")]
    EmptyBatch,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for SubmitDocumentsError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => SubmitDocumentsError::NotFound(id),
            other => SubmitDocumentsError::Storage(other.to_string()),
        }
    }
}

/// Handler for hardship document batches.
pub struct SubmitDocumentsHandler {
    store: Arc<dyn SessionStore>,
    classifier: Arc<dyn DocumentClassifier>,
    gate: HardshipGate,
    classifier_timeout: Duration,
}

impl SubmitDocumentsHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        classifier: Arc<dyn DocumentClassifier>,
        policy: &NegotiationPolicy,
        classifier_timeout: Duration,
    ) -> Self {
        Self {
            store,
            classifier,
            gate: HardshipGate::new(policy),
            classifier_timeout,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitDocumentsCommand,
    ) -> Result<SubmitDocumentsResult, SubmitDocumentsError> {
        if cmd.documents.is_empty() {
            return Err(SubmitDocumentsError::EmptyBatch);
        }

        let mut session = self.store.load(cmd.session_id).await?;

        let outcome = review_batch(
            self.classifier.as_ref(),
            &cmd.documents,
            self.classifier_timeout,
        )
        .await;

        session.apply_hardship_review(&self.gate, &outcome);
        self.store.save(&session).await?;

        let reason_label = match &outcome {
            ReviewOutcome::Approved => None,
            ReviewOutcome::Rejected { reason_label } => Some(reason_label.clone()),
        };

        tracing::info!(
            session_id = %cmd.session_id,
            hardship = ?session.hardship(),
            "hardship batch reviewed"
        );

        Ok(SubmitDocumentsResult {
            hardship: session.hardship(),
            reason_label,
        })
    }
}

/// Classifies a whole batch and folds it into one review outcome.
///
/// Any approved document approves the batch; otherwise the first
/// rejection's reason label is carried. Classifier errors and timeouts
/// read as rejections so the gate never sticks in pending review.
pub(crate) async fn review_batch(
    classifier: &dyn DocumentClassifier,
    documents: &[HardshipDocument],
    timeout: Duration,
) -> ReviewOutcome {
    let mut first_rejection: Option<String> = None;

    for document in documents {
        match tokio::time::timeout(timeout, classifier.classify(document)).await {
            Ok(Ok(classification)) if classification.approved => {
                return ReviewOutcome::Approved;
            }
            Ok(Ok(classification)) => {
                first_rejection.get_or_insert(classification.reason_label);
            }
            Ok(Err(err)) => {
                tracing::warn!(document_id = %document.id, error = %err, "classifier failed");
                first_rejection.get_or_insert_with(|| "classification_failed".to_string());
            }
            Err(_) => {
                tracing::warn!(document_id = %document.id, "classifier timed out");
                first_rejection.get_or_insert_with(|| "classification_timed_out".to_string());
            }
        }
    }

    ReviewOutcome::Rejected {
        reason_label: first_rejection.unwrap_or_else(|| "no_decision".to_string()),
    }
}
