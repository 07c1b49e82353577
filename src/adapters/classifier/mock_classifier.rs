//! Mock Document Classifier for testing.
//!
//! Returns pre-configured classifications in order and can inject
//! errors, mirroring the mock AI provider.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::negotiation::HardshipDocument;
use crate::ports::{Classification, ClassifierError, DocumentClassifier};

/// A configured mock result.
#[derive(Debug, Clone)]
enum MockResult {
    Classification(Classification),
    Unavailable(String),
    Timeout(u32),
}

/// Mock classifier for testing.
#[derive(Debug, Clone, Default)]
pub struct MockClassifier {
    results: Arc<Mutex<VecDeque<MockResult>>>,
    calls: Arc<Mutex<Vec<HardshipDocument>>>,
}

impl MockClassifier {
    /// Creates a new mock classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an approval.
    pub fn with_approval(self, reason_label: impl Into<String>) -> Self {
        self.push(MockResult::Classification(Classification::approved(
            reason_label,
        )))
    }

    /// Queues a rejection.
    pub fn with_rejection(self, reason_label: impl Into<String>) -> Self {
        self.push(MockResult::Classification(Classification::rejected(
            reason_label,
        )))
    }

    /// Queues an unavailable error.
    pub fn with_unavailable(self, message: impl Into<String>) -> Self {
        self.push(MockResult::Unavailable(message.into()))
    }

    /// Queues a timeout error.
    pub fn with_timeout(self, timeout_secs: u32) -> Self {
        self.push(MockResult::Timeout(timeout_secs))
    }

    /// Number of classify calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn push(self, result: MockResult) -> Self {
        self.results.lock().unwrap().push_back(result);
        self
    }
}

#[async_trait]
impl DocumentClassifier for MockClassifier {
    async fn classify(
        &self,
        document: &HardshipDocument,
    ) -> Result<Classification, ClassifierError> {
        self.calls.lock().unwrap().push(document.clone());

        let next = self.results.lock().unwrap().pop_front();
        match next {
            Some(MockResult::Classification(c)) => Ok(c),
            Some(MockResult::Unavailable(message)) => Err(ClassifierError::unavailable(message)),
            Some(MockResult::Timeout(timeout_secs)) => {
                Err(ClassifierError::Timeout { timeout_secs })
            }
            // Default to rejection so tests must opt in to approvals
            None => Ok(Classification::rejected("no_mock_configured")),
        }
    }
}
