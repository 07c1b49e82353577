//! Negotiation command and query handlers.

mod get_session;
mod process_turn;
mod start_session;
mod submit_documents;

pub use get_session::{GetSessionError, GetSessionHandler, GetSessionQuery, SessionView};
pub use process_turn::{
    ProcessTurnCommand, ProcessTurnError, ProcessTurnHandler, ProcessTurnResult,
};
pub use start_session::{
    StartSessionCommand, StartSessionError, StartSessionHandler, StartSessionResult,
};
pub use submit_documents::{
    SubmitDocumentsCommand, SubmitDocumentsError, SubmitDocumentsHandler, SubmitDocumentsResult,
};
