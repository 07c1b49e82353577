//! Foundation value objects shared across the domain.

mod errors;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{DocumentId, SessionId};
pub use money::{Money, MoneyParseError};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
