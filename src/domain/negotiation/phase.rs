//! Negotiation phases within a session.
//!
//! The phase tracks where the agreement process stands; it is distinct
//! from hardship review state, which gates caps rather than flow.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// The current phase of a negotiation session.
///
/// Phases flow forward only:
/// `Initial` → `AwaitingIncome` → `Negotiating` → `Completed`, with
/// shortcuts straight to `Negotiating` or `Completed` when the user
/// volunteers a term or agrees immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationPhase {
    /// First contact; establish whether the user can pay in full.
    #[default]
    Initial,

    /// Waiting for an income figure (or a clarifying answer to an
    /// ambiguous one).
    AwaitingIncome,

    /// Offers are on the table; terms are being negotiated.
    Negotiating,

    /// A schedule-backed payment link has been issued. Terminal.
    Completed,
}

impl StateMachine for NegotiationPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use NegotiationPhase::*;
        matches!(
            (self, target),
            (Initial, AwaitingIncome)
                | (Initial, Negotiating)
                | (Initial, Completed)
                | (AwaitingIncome, Negotiating)
                | (AwaitingIncome, Completed)
                | (Negotiating, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use NegotiationPhase::*;
        match self {
            Initial => vec![AwaitingIncome, Negotiating, Completed],
            AwaitingIncome => vec![Negotiating, Completed],
            Negotiating => vec![Completed],
            Completed => vec![],
        }
    }
}

impl NegotiationPhase {
    /// Short label for logs and state views.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::AwaitingIncome => "Awaiting income",
            Self::Negotiating => "Negotiating",
            Self::Completed => "Completed",
        }
    }

    /// The model's primary directive in this phase.
    ///
    /// Guides tone and purpose only; every figure the model presents is
    /// supplied by the deterministic layer.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Initial => {
                "Ask whether the user can pay the full balance today. Be courteous and direct."
            }
            Self::AwaitingIncome => {
                "Ask for the user's monthly income so a realistic plan can be proposed. \
                 If an amount is ambiguous, ask whether it is monthly or annual."
            }
            Self::Negotiating => {
                "Present the supplied payment plan exactly as given. Never invent amounts \
                 or terms; echo the figures provided."
            }
            Self::Completed => {
                "Terms are settled. Acknowledge politely and refer the user to their \
                 payment link; do not reopen negotiation."
            }
        }
    }
}
