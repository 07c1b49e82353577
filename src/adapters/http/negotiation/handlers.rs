//! HTTP handlers for negotiation endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::negotiation::{
    GetSessionError, GetSessionHandler, GetSessionQuery, ProcessTurnCommand, ProcessTurnError,
    ProcessTurnHandler, StartSessionCommand, StartSessionError, StartSessionHandler,
    SubmitDocumentsCommand, SubmitDocumentsError, SubmitDocumentsHandler,
};
use crate::domain::foundation::{Money, SessionId};

use super::dto::{
    ErrorResponse, SessionResponse, StartSessionRequest, StartSessionResponse,
    SubmitDocumentsRequest, SubmitDocumentsResponse, TurnRequest, TurnResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct NegotiationHandlers {
    start_handler: Arc<StartSessionHandler>,
    turn_handler: Arc<ProcessTurnHandler>,
    documents_handler: Arc<SubmitDocumentsHandler>,
    get_handler: Arc<GetSessionHandler>,
}

impl NegotiationHandlers {
    pub fn new(
        start_handler: Arc<StartSessionHandler>,
        turn_handler: Arc<ProcessTurnHandler>,
        documents_handler: Arc<SubmitDocumentsHandler>,
        get_handler: Arc<GetSessionHandler>,
    ) -> Self {
        Self {
            start_handler,
            turn_handler,
            documents_handler,
            get_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/sessions - Open a negotiation session
pub async fn start_session(
    State(handlers): State<NegotiationHandlers>,
    Json(req): Json<StartSessionRequest>,
) -> Response {
    let total_debt = match req.total_debt.parse::<Money>() {
        Ok(amount) => amount,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(format!("Invalid debt amount: {}", e))),
            )
                .into_response()
        }
    };

    match handlers.start_handler.handle(StartSessionCommand { total_debt }).await {
        Ok(result) => {
            let response = StartSessionResponse {
                session_id: result.session_id.to_string(),
                greeting: result.greeting,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(StartSessionError::Session(e)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(e.to_string())),
        )
            .into_response(),
        Err(StartSessionError::Storage(e)) => internal_error(e),
    }
}

/// POST /api/sessions/:id/turns - Process one negotiation turn
pub async fn process_turn(
    State(handlers): State<NegotiationHandlers>,
    Path(session_id): Path<String>,
    Json(req): Json<TurnRequest>,
) -> Response {
    let Some(session_id) = parse_session_id(&session_id) else {
        return invalid_session_id();
    };

    let cmd = ProcessTurnCommand {
        session_id,
        user_message: req.user_message,
        uploaded_documents: req
            .uploaded_documents
            .into_iter()
            .map(|d| d.into_domain())
            .collect(),
    };

    match handlers.turn_handler.handle(cmd).await {
        Ok(result) => {
            let response = TurnResponse {
                response_text: result.response_text,
                agreement_reached: result.agreement_reached,
                hardship_approved: result.hardship_approved,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(ProcessTurnError::NotFound(id)) => session_not_found(id),
        Err(ProcessTurnError::EmptyTurn) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(
                "Turn carries neither a message nor documents",
            )),
        )
            .into_response(),
        Err(ProcessTurnError::Storage(e)) | Err(ProcessTurnError::Internal(e)) => {
            internal_error(e)
        }
    }
}

/// POST /api/sessions/:id/documents - Submit hardship documents
pub async fn submit_documents(
    State(handlers): State<NegotiationHandlers>,
    Path(session_id): Path<String>,
    Json(req): Json<SubmitDocumentsRequest>,
) -> Response {
    let Some(session_id) = parse_session_id(&session_id) else {
        return invalid_session_id();
    };

    let cmd = SubmitDocumentsCommand {
        session_id,
        documents: req.documents.into_iter().map(|d| d.into_domain()).collect(),
    };

    match handlers.documents_handler.handle(cmd).await {
        Ok(result) => {
            let response = SubmitDocumentsResponse {
                hardship: result.hardship,
                reason_label: result.reason_label,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(SubmitDocumentsError::NotFound(id)) => session_not_found(id),
        Err(SubmitDocumentsError::EmptyBatch) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("No documents in batch")),
        )
            .into_response(),
        Err(SubmitDocumentsError::Storage(e)) => internal_error(e),
    }
}

/// GET /api/sessions/:id - Session state view
pub async fn get_session(
    State(handlers): State<NegotiationHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let Some(session_id) = parse_session_id(&session_id) else {
        return invalid_session_id();
    };

    match handlers.get_handler.handle(GetSessionQuery { session_id }).await {
        Ok(view) => {
            let response: SessionResponse = view.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(GetSessionError::NotFound(id)) => session_not_found(id),
        Err(GetSessionError::Storage(e)) => internal_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn parse_session_id(raw: &str) -> Option<SessionId> {
    raw.parse::<SessionId>().ok()
}

fn invalid_session_id() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request("Invalid session ID")),
    )
        .into_response()
}

fn session_not_found(id: SessionId) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::not_found(format!("Session not found: {}", id))),
    )
        .into_response()
}

fn internal_error(detail: String) -> Response {
    tracing::error!(error = %detail, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal("Something went wrong")),
    )
        .into_response()
}
