//! The negotiation domain: deterministic payment-plan computation and
//! the agreement state machine.

pub mod hardship;
pub mod income;
pub mod offer;
pub mod payment_link;
pub mod phase;
pub mod policy;
pub mod reconciler;
pub mod schedule;
pub mod session;
pub mod signals;

pub use hardship::{HardshipDocument, HardshipGate, HardshipStatus, ReviewOutcome};
pub use income::{IncomeEstimate, IncomeSignal};
pub use offer::{OfferContext, OfferPolicy, OfferRationale, ProposedOffer};
pub use payment_link::{LocatedPaymentLink, PaymentLink, PAYMENT_LINK_PREFIX};
pub use phase::NegotiationPhase;
pub use policy::{IncomeTier, NegotiationPolicy};
pub use reconciler::ResponseReconciler;
pub use schedule::{InstallmentSchedule, ScheduleError};
pub use session::{ChatMessage, ChatRole, NegotiationSession, SessionError};
pub use signals::TurnSignals;
