//! The negotiation session aggregate.
//!
//! Owns every piece of per-conversation state: the fixed debt, the
//! phase, hardship review status, the income estimate, the standing
//! offer, and the transcript. All mutation goes through validated
//! methods; hardship status changes only via the gate transition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{Money, SessionId, StateMachine, Timestamp, ValidationError};
use crate::domain::negotiation::hardship::{HardshipGate, HardshipStatus, ReviewOutcome};
use crate::domain::negotiation::income::IncomeEstimate;
use crate::domain::negotiation::phase::NegotiationPhase;
use crate::domain::negotiation::schedule::InstallmentSchedule;

/// Errors raised by session lifecycle operations.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The only unrecoverable input: a session cannot exist without a
    /// positive debt.
    #[error("debt must be positive, got {amount}")]
    InvalidDebt { amount: Money },

    #[error("session is already completed")]
    AlreadyCompleted,

    #[error(transparent)]
    InvalidTransition(#[from] ValidationError),
}

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub at: Timestamp,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            at: Timestamp::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            at: Timestamp::now(),
        }
    }
}

/// A single negotiation conversation and all of its state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationSession {
    id: SessionId,
    debt: Money,
    phase: NegotiationPhase,
    hardship: HardshipStatus,
    income: Option<IncomeEstimate>,
    /// An ambiguous income figure awaiting a clarifying answer.
    pending_income: Option<Money>,
    /// Term of the offer currently on the table.
    offered_term: Option<u32>,
    final_schedule: Option<InstallmentSchedule>,
    history: Vec<ChatMessage>,
    turn_count: u32,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl NegotiationSession {
    /// Opens a session for a fixed debt. Rejects non-positive debt.
    pub fn new(debt: Money) -> Result<Self, SessionError> {
        if !debt.is_positive() {
            return Err(SessionError::InvalidDebt { amount: debt });
        }
        let now = Timestamp::now();
        Ok(Self {
            id: SessionId::new(),
            debt,
            phase: NegotiationPhase::Initial,
            hardship: HardshipStatus::Unset,
            income: None,
            pending_income: None,
            offered_term: None,
            final_schedule: None,
            history: Vec::new(),
            turn_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn debt(&self) -> Money {
        self.debt
    }

    pub fn phase(&self) -> NegotiationPhase {
        self.phase
    }

    pub fn hardship(&self) -> HardshipStatus {
        self.hardship
    }

    pub fn income(&self) -> Option<IncomeEstimate> {
        self.income
    }

    pub fn pending_income(&self) -> Option<Money> {
        self.pending_income
    }

    pub fn offered_term(&self) -> Option<u32> {
        self.offered_term
    }

    pub fn final_schedule(&self) -> Option<&InstallmentSchedule> {
        self.final_schedule.as_ref()
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn is_completed(&self) -> bool {
        self.phase == NegotiationPhase::Completed
    }

    /// Appends a user message and counts the turn.
    pub fn record_user_message(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::user(content));
        self.turn_count += 1;
        self.touch();
    }

    /// Appends an assistant message.
    pub fn record_assistant_message(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::assistant(content));
        self.touch();
    }

    /// Moves to a later phase, validating the transition. Requesting the
    /// current phase is a no-op.
    pub fn advance_phase(&mut self, target: NegotiationPhase) -> Result<(), SessionError> {
        if self.phase == target {
            return Ok(());
        }
        self.phase = self.phase.transition_to(target)?;
        self.touch();
        Ok(())
    }

    /// Records a resolved monthly income estimate and clears any pending
    /// clarification.
    pub fn set_income(&mut self, estimate: IncomeEstimate) {
        self.income = Some(estimate);
        self.pending_income = None;
        self.touch();
    }

    /// Parks an ambiguous figure until the user clarifies its basis.
    pub fn set_pending_income(&mut self, amount: Money) {
        self.pending_income = Some(amount);
        self.touch();
    }

    /// Records the term of the offer now on the table.
    pub fn note_offer(&mut self, term: u32) {
        self.offered_term = Some(term);
        self.touch();
    }

    /// Applies one atomic batch review through the hardship gate.
    ///
    /// This is the only way hardship status changes.
    pub fn apply_hardship_review(&mut self, gate: &HardshipGate, outcome: &ReviewOutcome) {
        self.hardship = gate.apply_review(self.hardship, outcome);
        self.touch();
    }

    /// Completes the session, recording the agreed schedule. Terminal.
    pub fn complete(&mut self, schedule: InstallmentSchedule) -> Result<(), SessionError> {
        if self.is_completed() {
            return Err(SessionError::AlreadyCompleted);
        }
        self.phase = self.phase.transition_to(NegotiationPhase::Completed)?;
        self.final_schedule = Some(schedule);
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::negotiation::policy::NegotiationPolicy;

    fn session() -> NegotiationSession {
        NegotiationSession::new(Money::from_dollars(2400)).unwrap()
    }

    fn gate() -> HardshipGate {
        HardshipGate::new(&NegotiationPolicy::default())
    }

    mod creation {
        use super::*;

        #[test]
        fn opens_in_initial_phase_with_no_state() {
            let session = session();
            assert_eq!(session.phase(), NegotiationPhase::Initial);
            assert_eq!(session.hardship(), HardshipStatus::Unset);
            assert_eq!(session.income(), None);
            assert_eq!(session.offered_term(), None);
            assert!(session.history().is_empty());
        }

        #[test]
        fn rejects_zero_debt() {
            assert!(matches!(
                NegotiationSession::new(Money::ZERO),
                Err(SessionError::InvalidDebt { .. })
            ));
        }

        #[test]
        fn rejects_negative_debt() {
            assert!(matches!(
                NegotiationSession::new(Money::from_cents(-100)),
                Err(SessionError::InvalidDebt { .. })
            ));
        }
    }

    mod transcript {
        use super::*;

        #[test]
        fn user_messages_count_turns() {
            let mut session = session();
            session.record_user_message("hello");
            session.record_assistant_message("hi there");
            session.record_user_message("I owe money");

            assert_eq!(session.turn_count(), 2);
            assert_eq!(session.history().len(), 3);
            assert_eq!(session.history()[0].role, ChatRole::User);
            assert_eq!(session.history()[1].role, ChatRole::Assistant);
        }
    }

    mod phases {
        use super::*;

        #[test]
        fn advances_through_the_expected_flow() {
            let mut session = session();
            session.advance_phase(NegotiationPhase::AwaitingIncome).unwrap();
            session.advance_phase(NegotiationPhase::Negotiating).unwrap();
            assert_eq!(session.phase(), NegotiationPhase::Negotiating);
        }

        #[test]
        fn advancing_to_current_phase_is_a_no_op() {
            let mut session = session();
            session.advance_phase(NegotiationPhase::Initial).unwrap();
            assert_eq!(session.phase(), NegotiationPhase::Initial);
        }

        #[test]
        fn backward_transitions_are_rejected() {
            let mut session = session();
            session.advance_phase(NegotiationPhase::Negotiating).unwrap();
            assert!(session
                .advance_phase(NegotiationPhase::AwaitingIncome)
                .is_err());
            // State is untouched by the failed transition
            assert_eq!(session.phase(), NegotiationPhase::Negotiating);
        }
    }

    mod income {
        use super::*;

        #[test]
        fn pending_income_clears_when_resolved() {
            let mut session = session();
            session.set_pending_income(Money::from_dollars(54_000));
            assert_eq!(session.pending_income(), Some(Money::from_dollars(54_000)));

            session.set_income(IncomeEstimate::new(Money::from_dollars(4_500)));
            assert_eq!(session.pending_income(), None);
            assert_eq!(
                session.income(),
                Some(IncomeEstimate::new(Money::from_dollars(4_500)))
            );
        }

        #[test]
        fn income_can_be_corrected_later() {
            let mut session = session();
            session.set_income(IncomeEstimate::new(Money::from_dollars(10_000)));
            session.set_income(IncomeEstimate::new(Money::from_dollars(4_500)));
            assert_eq!(
                session.income(),
                Some(IncomeEstimate::new(Money::from_dollars(4_500)))
            );
        }
    }

    mod hardship {
        use super::*;

        #[test]
        fn review_goes_through_the_gate() {
            let mut session = session();
            session.apply_hardship_review(&gate(), &ReviewOutcome::Approved);
            assert_eq!(session.hardship(), HardshipStatus::Approved);
        }

        #[test]
        fn approval_survives_later_rejection() {
            let mut session = session();
            session.apply_hardship_review(&gate(), &ReviewOutcome::Approved);
            session.apply_hardship_review(
                &gate(),
                &ReviewOutcome::Rejected {
                    reason_label: "unreadable".to_string(),
                },
            );
            assert_eq!(session.hardship(), HardshipStatus::Approved);
        }
    }

    mod completion {
        use super::*;

        #[test]
        fn completion_records_the_final_schedule() {
            let mut session = session();
            session.advance_phase(NegotiationPhase::Negotiating).unwrap();

            let schedule =
                InstallmentSchedule::compute(session.debt(), 7).unwrap();
            session.complete(schedule).unwrap();

            assert!(session.is_completed());
            assert_eq!(session.final_schedule(), Some(&schedule));
        }

        #[test]
        fn completing_twice_is_rejected() {
            let mut session = session();
            let schedule = InstallmentSchedule::compute(session.debt(), 3).unwrap();
            session.complete(schedule).unwrap();

            let again = InstallmentSchedule::compute(session.debt(), 6).unwrap();
            assert!(matches!(
                session.complete(again),
                Err(SessionError::AlreadyCompleted)
            ));
            // The recorded schedule is unchanged
            assert_eq!(session.final_schedule(), Some(&schedule));
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn session_round_trips_through_json() {
            let mut session = session();
            session.record_user_message("hello");
            session.advance_phase(NegotiationPhase::AwaitingIncome).unwrap();

            let json = serde_json::to_string(&session).unwrap();
            let back: NegotiationSession = serde_json::from_str(&json).unwrap();

            assert_eq!(back.id(), session.id());
            assert_eq!(back.phase(), session.phase());
            assert_eq!(back.debt(), session.debt());
            assert_eq!(back.history().len(), 1);
        }
    }
}
