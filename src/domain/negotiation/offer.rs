//! Term selection rules for the negotiation.
//!
//! Starts aggressive and widens only under resistance. Every selected
//! term is paired with its freshly computed schedule; a term is never
//! surfaced without exact figures.

use crate::domain::foundation::Money;
use crate::domain::negotiation::hardship::{HardshipGate, HardshipStatus};
use crate::domain::negotiation::income::IncomeEstimate;
use crate::domain::negotiation::policy::{IncomeTier, NegotiationPolicy};
use crate::domain::negotiation::schedule::{InstallmentSchedule, ScheduleError};

/// Why a particular term was selected; drives the response wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferRationale {
    /// The user asked for this term and it is within the cap.
    HonoredRequest,
    /// The request exceeded the base cap without approved hardship;
    /// countered at the base cap, documentation required for more.
    CappedForDocumentation { requested: u32 },
    /// The request exceeded even the extended cap; countered at it.
    CappedAtExtended { requested: u32 },
    /// Opening offer selected from the income tier.
    Opening { tier: IncomeTier },
    /// Widened one step after affordability pushback.
    Widened,
    /// Re-presenting the standing offer; no new signal this turn.
    Standing,
}

/// A term together with its authoritative schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposedOffer {
    pub term_length: u32,
    pub schedule: InstallmentSchedule,
    pub rationale: OfferRationale,
}

/// Everything term selection depends on for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OfferContext {
    pub hardship: HardshipStatus,
    pub income: Option<IncomeEstimate>,
    pub requested_term: Option<u32>,
    /// Term of the offer currently on the table, if any.
    pub previous_term: Option<u32>,
    /// The user pushed back on affordability this turn.
    pub resists: bool,
}

/// Selects term lengths according to the negotiation policy.
#[derive(Debug, Clone)]
pub struct OfferPolicy {
    policy: NegotiationPolicy,
    gate: HardshipGate,
}

impl OfferPolicy {
    pub fn new(policy: NegotiationPolicy) -> Self {
        let gate = HardshipGate::new(&policy);
        Self { policy, gate }
    }

    /// The gate used for cap decisions.
    pub fn gate(&self) -> &HardshipGate {
        &self.gate
    }

    /// Selects a term for this turn and computes its schedule.
    ///
    /// Decision rules, in priority order: honor an in-cap request;
    /// counter an over-cap request at the applicable cap; widen one step
    /// under resistance; otherwise open from the income tier. With a
    /// standing offer and no new signal, the same offer is re-presented.
    pub fn propose(
        &self,
        debt: Money,
        ctx: &OfferContext,
    ) -> Result<ProposedOffer, ScheduleError> {
        let cap = self.gate.max_allowed_term(ctx.hardship);

        let (term, rationale) = if let Some(requested) = ctx.requested_term.filter(|t| *t >= 1) {
            if requested <= cap {
                (requested, OfferRationale::HonoredRequest)
            } else if ctx.hardship == HardshipStatus::Approved {
                (cap, OfferRationale::CappedAtExtended { requested })
            } else {
                (cap, OfferRationale::CappedForDocumentation { requested })
            }
        } else if ctx.resists {
            match ctx.previous_term {
                Some(previous) => {
                    let widened = previous.saturating_add(self.policy.widen_step_months).min(cap);
                    (widened, OfferRationale::Widened)
                }
                None => self.opening(ctx),
            }
        } else if let Some(previous) = ctx.previous_term {
            (previous.min(cap), OfferRationale::Standing)
        } else {
            self.opening(ctx)
        };

        let schedule = InstallmentSchedule::compute(debt, term)?;
        Ok(ProposedOffer {
            term_length: term,
            schedule,
            rationale,
        })
    }

    fn opening(&self, ctx: &OfferContext) -> (u32, OfferRationale) {
        let tier = self.policy.income_tier(ctx.income.map(|i| i.monthly));
        let term = self
            .policy
            .starting_term(tier)
            .min(self.gate.max_allowed_term(ctx.hardship));
        (term, OfferRationale::Opening { tier })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> OfferPolicy {
        OfferPolicy::new(NegotiationPolicy::default())
    }

    fn debt() -> Money {
        Money::from_dollars(2400)
    }

    fn monthly(dollars: i64) -> Option<IncomeEstimate> {
        Some(IncomeEstimate::new(Money::from_dollars(dollars)))
    }

    mod explicit_requests {
        use super::*;

        #[test]
        fn in_cap_request_is_honored_directly() {
            let offer = policy()
                .propose(
                    debt(),
                    &OfferContext {
                        requested_term: Some(9),
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(offer.term_length, 9);
            assert_eq!(offer.rationale, OfferRationale::HonoredRequest);
        }

        #[test]
        fn over_base_cap_without_hardship_counters_at_base_cap() {
            let offer = policy()
                .propose(
                    debt(),
                    &OfferContext {
                        requested_term: Some(18),
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(offer.term_length, 12);
            assert_eq!(
                offer.rationale,
                OfferRationale::CappedForDocumentation { requested: 18 }
            );
        }

        #[test]
        fn over_base_cap_with_approval_is_honored() {
            let offer = policy()
                .propose(
                    debt(),
                    &OfferContext {
                        hardship: HardshipStatus::Approved,
                        requested_term: Some(20),
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(offer.term_length, 20);
            assert_eq!(offer.rationale, OfferRationale::HonoredRequest);
        }

        #[test]
        fn over_extended_cap_counters_at_extended_cap() {
            let offer = policy()
                .propose(
                    debt(),
                    &OfferContext {
                        hardship: HardshipStatus::Approved,
                        requested_term: Some(36),
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(offer.term_length, 24);
            assert_eq!(
                offer.rationale,
                OfferRationale::CappedAtExtended { requested: 36 }
            );
        }

        #[test]
        fn honored_request_carries_exact_schedule() {
            let offer = policy()
                .propose(
                    debt(),
                    &OfferContext {
                        requested_term: Some(7),
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(offer.schedule.base_amount, Money::from_cents(34285));
            assert_eq!(offer.schedule.final_amount, Money::from_cents(34290));
        }
    }

    mod opening_offers {
        use super::*;

        #[test]
        fn high_income_opens_shortest() {
            let offer = policy()
                .propose(
                    debt(),
                    &OfferContext {
                        income: monthly(6_000),
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(offer.term_length, 3);
        }

        #[test]
        fn mid_income_opens_medium() {
            let offer = policy()
                .propose(
                    debt(),
                    &OfferContext {
                        income: monthly(3_000),
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(offer.term_length, 6);
        }

        #[test]
        fn unknown_income_opens_longest_default() {
            let offer = policy().propose(debt(), &OfferContext::default()).unwrap();
            assert_eq!(offer.term_length, 12);
            assert_eq!(
                offer.rationale,
                OfferRationale::Opening {
                    tier: IncomeTier::LowOrUnknown
                }
            );
        }

        #[test]
        fn opening_terms_are_monotone_in_income() {
            let p = policy();
            let term_at = |income| {
                p.propose(
                    debt(),
                    &OfferContext {
                        income,
                        ..Default::default()
                    },
                )
                .unwrap()
                .term_length
            };
            assert!(term_at(monthly(6_000)) <= term_at(monthly(3_000)));
            assert!(term_at(monthly(3_000)) <= term_at(None));
        }
    }

    mod widening {
        use super::*;

        #[test]
        fn resistance_widens_one_step() {
            let offer = policy()
                .propose(
                    debt(),
                    &OfferContext {
                        previous_term: Some(6),
                        resists: true,
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(offer.term_length, 9);
            assert_eq!(offer.rationale, OfferRationale::Widened);
        }

        #[test]
        fn widening_never_exceeds_the_cap() {
            let offer = policy()
                .propose(
                    debt(),
                    &OfferContext {
                        previous_term: Some(12),
                        resists: true,
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(offer.term_length, 12);
        }

        #[test]
        fn widening_uses_extended_cap_when_approved() {
            let offer = policy()
                .propose(
                    debt(),
                    &OfferContext {
                        hardship: HardshipStatus::Approved,
                        previous_term: Some(12),
                        resists: true,
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(offer.term_length, 15);
        }
    }

    mod standing_offers {
        use super::*;

        #[test]
        fn no_new_signal_re_presents_previous_term() {
            let offer = policy()
                .propose(
                    debt(),
                    &OfferContext {
                        previous_term: Some(6),
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(offer.term_length, 6);
            assert_eq!(offer.rationale, OfferRationale::Standing);
        }
    }
}
