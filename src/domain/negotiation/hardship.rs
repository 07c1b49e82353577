//! Hardship documentation review state and term-cap gating.
//!
//! Approved hardship documentation unlocks the extended term cap. The
//! status is owned by the session and mutated only through the gate's
//! transition function, never assigned directly.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DocumentId, StateMachine};
use crate::domain::negotiation::policy::NegotiationPolicy;

/// Review state of hardship documentation for a session.
///
/// `Approved` is terminal for the session; once documentation has been
/// accepted it never reverts, no matter what is submitted afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardshipStatus {
    /// No documentation has been submitted.
    #[default]
    Unset,
    /// Documentation submitted, classifier result not yet applied.
    PendingReview,
    /// Documentation accepted; the extended term cap applies.
    Approved,
    /// Documentation rejected; resubmission is allowed.
    Rejected,
}

impl StateMachine for HardshipStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use HardshipStatus::*;
        matches!(
            (self, target),
            (Unset, PendingReview)
                | (PendingReview, Approved)
                | (PendingReview, Rejected)
                | (Rejected, PendingReview)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use HardshipStatus::*;
        match self {
            Unset => vec![PendingReview],
            PendingReview => vec![Approved, Rejected],
            Approved => vec![],
            Rejected => vec![PendingReview],
        }
    }
}

/// A reference to an uploaded hardship document.
///
/// Bytes live with the external upload/storage collaborator; the domain
/// only carries the reference handed to the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardshipDocument {
    pub id: DocumentId,
    pub file_name: String,
    pub url: String,
}

/// Outcome of classifying one upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    Approved,
    Rejected { reason_label: String },
}

/// Gates the maximum allowed term length on hardship approval.
#[derive(Debug, Clone, Copy)]
pub struct HardshipGate {
    base_term_cap: u32,
    extended_term_cap: u32,
}

impl HardshipGate {
    /// Builds a gate from the negotiation policy's caps.
    pub fn new(policy: &NegotiationPolicy) -> Self {
        Self {
            base_term_cap: policy.base_term_cap,
            extended_term_cap: policy.extended_term_cap,
        }
    }

    /// Maximum term length allowed under the given status.
    ///
    /// Anything other than `Approved` gets the base cap.
    pub fn max_allowed_term(&self, status: HardshipStatus) -> u32 {
        match status {
            HardshipStatus::Approved => self.extended_term_cap,
            _ => self.base_term_cap,
        }
    }

    /// Applies one atomic batch review to the current status.
    ///
    /// The submission and the classifier result are applied together, so
    /// a caller never observes a batch stuck in `PendingReview`.
    /// Idempotent: once `Approved`, repeated submissions are no-ops.
    pub fn apply_review(
        &self,
        current: HardshipStatus,
        outcome: &ReviewOutcome,
    ) -> HardshipStatus {
        if current == HardshipStatus::Approved {
            return HardshipStatus::Approved;
        }
        match outcome {
            ReviewOutcome::Approved => HardshipStatus::Approved,
            ReviewOutcome::Rejected { .. } => HardshipStatus::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> HardshipGate {
        HardshipGate::new(&NegotiationPolicy::default())
    }

    mod status_machine {
        use super::*;

        #[test]
        fn default_status_is_unset() {
            assert_eq!(HardshipStatus::default(), HardshipStatus::Unset);
        }

        #[test]
        fn submission_moves_unset_to_pending() {
            assert!(HardshipStatus::Unset.can_transition_to(&HardshipStatus::PendingReview));
        }

        #[test]
        fn pending_resolves_to_approved_or_rejected() {
            let pending = HardshipStatus::PendingReview;
            assert!(pending.can_transition_to(&HardshipStatus::Approved));
            assert!(pending.can_transition_to(&HardshipStatus::Rejected));
        }

        #[test]
        fn rejected_allows_resubmission() {
            assert!(HardshipStatus::Rejected.can_transition_to(&HardshipStatus::PendingReview));
        }

        #[test]
        fn approved_is_terminal() {
            assert!(HardshipStatus::Approved.is_terminal());
            assert!(!HardshipStatus::Approved.can_transition_to(&HardshipStatus::PendingReview));
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&HardshipStatus::PendingReview).unwrap();
            assert_eq!(json, "\"pending_review\"");
        }
    }

    mod term_caps {
        use super::*;

        #[test]
        fn unapproved_statuses_get_base_cap() {
            let gate = gate();
            for status in [
                HardshipStatus::Unset,
                HardshipStatus::PendingReview,
                HardshipStatus::Rejected,
            ] {
                assert_eq!(gate.max_allowed_term(status), 12);
            }
        }

        #[test]
        fn approved_gets_extended_cap() {
            assert_eq!(gate().max_allowed_term(HardshipStatus::Approved), 24);
        }

        #[test]
        fn extended_cap_strictly_exceeds_base_cap() {
            let gate = gate();
            assert!(
                gate.max_allowed_term(HardshipStatus::Approved)
                    > gate.max_allowed_term(HardshipStatus::Unset)
            );
        }
    }

    mod review {
        use super::*;

        #[test]
        fn approval_from_unset() {
            let status = gate().apply_review(HardshipStatus::Unset, &ReviewOutcome::Approved);
            assert_eq!(status, HardshipStatus::Approved);
        }

        #[test]
        fn rejection_from_unset() {
            let status = gate().apply_review(
                HardshipStatus::Unset,
                &ReviewOutcome::Rejected {
                    reason_label: "unreadable".to_string(),
                },
            );
            assert_eq!(status, HardshipStatus::Rejected);
        }

        #[test]
        fn resubmission_after_rejection_can_approve() {
            let gate = gate();
            let rejected = gate.apply_review(
                HardshipStatus::Unset,
                &ReviewOutcome::Rejected {
                    reason_label: "wrong document type".to_string(),
                },
            );
            let approved = gate.apply_review(rejected, &ReviewOutcome::Approved);
            assert_eq!(approved, HardshipStatus::Approved);
        }

        #[test]
        fn approved_is_idempotent_under_resubmission() {
            let gate = gate();
            let status = gate.apply_review(
                HardshipStatus::Approved,
                &ReviewOutcome::Rejected {
                    reason_label: "unreadable".to_string(),
                },
            );
            assert_eq!(status, HardshipStatus::Approved);

            let status = gate.apply_review(HardshipStatus::Approved, &ReviewOutcome::Approved);
            assert_eq!(status, HardshipStatus::Approved);
        }
    }
}
