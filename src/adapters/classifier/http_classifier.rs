//! HTTP Document Classifier - calls the external hardship-document
//! classification service.
//!
//! The service receives a document reference (it fetches the bytes from
//! storage itself) and returns an approved/rejected decision with a
//! reason label.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::negotiation::HardshipDocument;
use crate::ports::{Classification, ClassifierError, DocumentClassifier};

/// Configuration for the HTTP classifier.
#[derive(Debug, Clone)]
pub struct HttpClassifierConfig {
    /// Base URL of the classifier service.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpClassifierConfig {
    /// Creates a configuration pointing at the given service.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP-backed document classifier.
pub struct HttpClassifier {
    config: HttpClassifierConfig,
    client: Client,
}

impl HttpClassifier {
    /// Creates a new classifier adapter.
    pub fn new(config: HttpClassifierConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn classify_url(&self) -> String {
        format!("{}/v1/classify", self.config.base_url)
    }
}

#[async_trait]
impl DocumentClassifier for HttpClassifier {
    async fn classify(
        &self,
        document: &HardshipDocument,
    ) -> Result<Classification, ClassifierError> {
        let request = ClassifyRequest {
            document_id: document.id.to_string(),
            file_name: document.file_name.clone(),
            url: document.url.clone(),
        };

        let response = self
            .client
            .post(self.classify_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else {
                    ClassifierError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::unavailable(format!(
                "status {}: {}",
                status, body
            )));
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::parse(e.to_string()))?;

        Ok(Classification {
            approved: body.approved,
            reason_label: body.reason_label,
        })
    }
}

#[derive(Debug, Serialize)]
struct ClassifyRequest {
    document_id: String,
    file_name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    approved: bool,
    #[serde(default)]
    reason_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_url_is_built_from_base() {
        let classifier = HttpClassifier::new(HttpClassifierConfig::new("http://docs.internal"));
        assert_eq!(classifier.classify_url(), "http://docs.internal/v1/classify");
    }

    #[test]
    fn response_parses_with_missing_reason() {
        let body: ClassifyResponse = serde_json::from_str(r#"{"approved": true}"#).unwrap();
        assert!(body.approved);
        assert_eq!(body.reason_label, "");
    }
}
