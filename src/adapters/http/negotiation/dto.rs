//! HTTP DTOs for negotiation endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing
//! independent evolution. Money crosses the wire as decimal-dollar
//! strings; cent-exact values appear only inside payment links.

use serde::{Deserialize, Serialize};

use crate::application::handlers::negotiation::SessionView;
use crate::domain::foundation::DocumentId;
use crate::domain::negotiation::{HardshipDocument, HardshipStatus, InstallmentSchedule, NegotiationPhase};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to open a session.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    /// Decimal dollars, e.g. "2400.00".
    pub total_debt: String,
}

/// One uploaded document reference.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentDto {
    #[serde(default)]
    pub document_id: Option<String>,
    pub file_name: String,
    pub url: String,
}

impl DocumentDto {
    /// Converts to the domain reference, minting an id when absent.
    pub fn into_domain(self) -> HardshipDocument {
        let id = self
            .document_id
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(DocumentId::new);
        HardshipDocument {
            id,
            file_name: self.file_name,
            url: self.url,
        }
    }
}

/// Request for one negotiation turn.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnRequest {
    #[serde(default)]
    pub user_message: String,
    #[serde(default)]
    pub uploaded_documents: Vec<DocumentDto>,
}

/// Request to submit hardship documents outside a turn.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitDocumentsRequest {
    pub documents: Vec<DocumentDto>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Response for session creation.
#[derive(Debug, Clone, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub greeting: String,
}

/// Response for one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub response_text: String,
    pub agreement_reached: bool,
    pub hardship_approved: bool,
}

/// Response for a document submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitDocumentsResponse {
    pub hardship: HardshipStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_label: Option<String>,
}

/// An installment schedule on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
    pub term_length: u32,
    pub base_amount: String,
    pub base_count: u32,
    pub final_amount: String,
}

impl From<InstallmentSchedule> for ScheduleResponse {
    fn from(schedule: InstallmentSchedule) -> Self {
        Self {
            term_length: schedule.term_length,
            base_amount: schedule.base_amount.to_decimal_string(),
            base_count: schedule.base_count,
            final_amount: schedule.final_amount.to_decimal_string(),
        }
    }
}

/// Detailed session view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub total_debt: String,
    pub phase: NegotiationPhase,
    pub hardship: HardshipStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_monthly: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offered_term: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_schedule: Option<ScheduleResponse>,
    pub turn_count: u32,
    pub agreement_reached: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SessionView> for SessionResponse {
    fn from(view: SessionView) -> Self {
        Self {
            id: view.id.to_string(),
            total_debt: view.total_debt.to_decimal_string(),
            phase: view.phase,
            hardship: view.hardship,
            income_monthly: view.income_monthly.map(|m| m.to_decimal_string()),
            offered_term: view.offered_term,
            final_schedule: view.final_schedule.map(Into::into),
            turn_count: view.turn_count,
            agreement_reached: view.agreement_reached,
            created_at: view.created_at.as_datetime().to_rfc3339(),
            updated_at: view.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Standard error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: "not_found".to_string(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: "internal_error".to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_dto_mints_id_when_absent() {
        let dto = DocumentDto {
            document_id: None,
            file_name: "letter.pdf".to_string(),
            url: "https://uploads.example/1".to_string(),
        };
        let doc = dto.into_domain();
        assert_eq!(doc.file_name, "letter.pdf");
    }

    #[test]
    fn document_dto_keeps_valid_id() {
        let id = DocumentId::new();
        let dto = DocumentDto {
            document_id: Some(id.to_string()),
            file_name: "letter.pdf".to_string(),
            url: "https://uploads.example/1".to_string(),
        };
        assert_eq!(dto.into_domain().id, id);
    }

    #[test]
    fn turn_request_defaults_are_permissive() {
        let req: TurnRequest = serde_json::from_str(r#"{"user_message": "hello"}"#).unwrap();
        assert_eq!(req.user_message, "hello");
        assert!(req.uploaded_documents.is_empty());
    }

    #[test]
    fn schedule_response_uses_decimal_strings() {
        use crate::domain::foundation::Money;
        let schedule = InstallmentSchedule::compute(Money::from_dollars(2400), 7).unwrap();
        let dto: ScheduleResponse = schedule.into();
        assert_eq!(dto.base_amount, "342.85");
        assert_eq!(dto.final_amount, "342.90");
    }
}
