//! Document Classifier Port - Interface for the hardship-document
//! classifier collaborator.
//!
//! The classifier is an opaque external service: it receives a document
//! reference and answers approved/rejected with a reason label. A
//! failing classifier is treated as a rejection upstream, never as a
//! review left pending.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::negotiation::HardshipDocument;

/// Port for hardship-document classification.
#[async_trait]
pub trait DocumentClassifier: Send + Sync {
    /// Classifies one document.
    async fn classify(&self, document: &HardshipDocument) -> Result<Classification, ClassifierError>;
}

/// Result of classifying one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Whether the document evidences qualifying hardship.
    pub approved: bool,
    /// Short machine label for the decision (e.g. "income_loss",
    /// "unreadable", "wrong_document_type").
    pub reason_label: String,
}

impl Classification {
    /// Creates an approval with the given reason label.
    pub fn approved(reason_label: impl Into<String>) -> Self {
        Self {
            approved: true,
            reason_label: reason_label.into(),
        }
    }

    /// Creates a rejection with the given reason label.
    pub fn rejected(reason_label: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason_label: reason_label.into(),
        }
    }
}

/// Classifier errors.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// Service is unavailable.
    #[error("classifier unavailable: {message}")]
    Unavailable { message: String },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse classifier response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request timed out.
    #[error("classification timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl ClassifierError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_constructors_set_flag() {
        let ok = Classification::approved("income_loss");
        assert!(ok.approved);
        assert_eq!(ok.reason_label, "income_loss");

        let no = Classification::rejected("unreadable");
        assert!(!no.approved);
        assert_eq!(no.reason_label, "unreadable");
    }

    #[test]
    fn classification_serializes_to_json() {
        let json = serde_json::to_string(&Classification::approved("income_loss")).unwrap();
        assert!(json.contains("\"approved\":true"));
        assert!(json.contains("income_loss"));
    }

    #[test]
    fn errors_display_their_cause() {
        assert_eq!(
            ClassifierError::unavailable("maintenance").to_string(),
            "classifier unavailable: maintenance"
        );
        assert_eq!(
            ClassifierError::Timeout { timeout_secs: 10 }.to_string(),
            "classification timed out after 10s"
        );
    }
}
