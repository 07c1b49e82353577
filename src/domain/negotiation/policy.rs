//! Negotiation policy configuration object.
//!
//! The source of truth for every negotiable knob: income tier thresholds,
//! term caps, starting terms, and the widening step. All other components
//! consume this one object instead of scattering their own constants.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Money, ValidationError};

/// Income tier derived from a monthly income estimate.
///
/// Lower tiers start negotiations at longer terms; an unknown income is
/// treated the same as the lowest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeTier {
    High,
    Mid,
    LowOrUnknown,
}

/// All negotiation policy knobs in one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationPolicy {
    /// Monthly income at or above which the user is in the high tier.
    pub high_income_threshold: Money,
    /// Monthly income at or above which the user is in the mid tier.
    pub mid_income_threshold: Money,
    /// Maximum term length without approved hardship documentation.
    pub base_term_cap: u32,
    /// Maximum term length with approved hardship documentation.
    pub extended_term_cap: u32,
    /// Opening term for high-tier income.
    pub starting_term_high: u32,
    /// Opening term for mid-tier income.
    pub starting_term_mid: u32,
    /// Opening term for low or unknown income.
    pub starting_term_fallback: u32,
    /// Months added per resisting turn when widening an offer.
    pub widen_step_months: u32,
    /// Bare dollar figures at or above this are ambiguous (could be annual).
    pub income_ambiguity_threshold: Money,
}

impl Default for NegotiationPolicy {
    fn default() -> Self {
        Self {
            high_income_threshold: Money::from_dollars(5_000),
            mid_income_threshold: Money::from_dollars(2_500),
            base_term_cap: 12,
            extended_term_cap: 24,
            starting_term_high: 3,
            starting_term_mid: 6,
            starting_term_fallback: 12,
            widen_step_months: 3,
            income_ambiguity_threshold: Money::from_dollars(10_000),
        }
    }
}

impl NegotiationPolicy {
    /// Validates internal consistency of the policy.
    ///
    /// The extended cap must strictly exceed the base cap, starting terms
    /// must fit under the base cap, and starting terms must be monotone:
    /// lower income never starts at a shorter term than higher income.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_term_cap < 1 {
            return Err(ValidationError::out_of_range(
                "base_term_cap",
                1,
                i64::from(self.extended_term_cap),
                i64::from(self.base_term_cap),
            ));
        }
        if self.extended_term_cap <= self.base_term_cap {
            return Err(ValidationError::invalid_format(
                "extended_term_cap",
                format!(
                    "extended cap {} must exceed base cap {}",
                    self.extended_term_cap, self.base_term_cap
                ),
            ));
        }
        for (field, term) in [
            ("starting_term_high", self.starting_term_high),
            ("starting_term_mid", self.starting_term_mid),
            ("starting_term_fallback", self.starting_term_fallback),
        ] {
            if term < 1 || term > self.base_term_cap {
                return Err(ValidationError::out_of_range(
                    field,
                    1,
                    i64::from(self.base_term_cap),
                    i64::from(term),
                ));
            }
        }
        if self.starting_term_high > self.starting_term_mid
            || self.starting_term_mid > self.starting_term_fallback
        {
            return Err(ValidationError::invalid_format(
                "starting_terms",
                "starting terms must not shorten as income drops",
            ));
        }
        if self.mid_income_threshold >= self.high_income_threshold {
            return Err(ValidationError::invalid_format(
                "mid_income_threshold",
                "mid threshold must be below high threshold",
            ));
        }
        if self.widen_step_months < 1 {
            return Err(ValidationError::out_of_range("widen_step_months", 1, 12, 0));
        }
        Ok(())
    }

    /// Classifies a monthly income estimate into a tier.
    pub fn income_tier(&self, monthly_income: Option<Money>) -> IncomeTier {
        match monthly_income {
            Some(income) if income >= self.high_income_threshold => IncomeTier::High,
            Some(income) if income >= self.mid_income_threshold => IncomeTier::Mid,
            _ => IncomeTier::LowOrUnknown,
        }
    }

    /// Opening term for a tier.
    pub fn starting_term(&self, tier: IncomeTier) -> u32 {
        match tier {
            IncomeTier::High => self.starting_term_high,
            IncomeTier::Mid => self.starting_term_mid,
            IncomeTier::LowOrUnknown => self.starting_term_fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        assert!(NegotiationPolicy::default().validate().is_ok());
    }

    #[test]
    fn extended_cap_must_strictly_exceed_base_cap() {
        let policy = NegotiationPolicy {
            extended_term_cap: 12,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn starting_terms_must_fit_under_base_cap() {
        let policy = NegotiationPolicy {
            starting_term_fallback: 18,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn starting_terms_must_be_monotone_in_income() {
        let policy = NegotiationPolicy {
            starting_term_high: 9,
            starting_term_mid: 6,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn income_tier_thresholds_are_inclusive() {
        let policy = NegotiationPolicy::default();
        assert_eq!(
            policy.income_tier(Some(Money::from_dollars(5_000))),
            IncomeTier::High
        );
        assert_eq!(
            policy.income_tier(Some(Money::from_dollars(4_999))),
            IncomeTier::Mid
        );
        assert_eq!(
            policy.income_tier(Some(Money::from_dollars(2_499))),
            IncomeTier::LowOrUnknown
        );
    }

    #[test]
    fn unknown_income_falls_to_lowest_tier() {
        let policy = NegotiationPolicy::default();
        assert_eq!(policy.income_tier(None), IncomeTier::LowOrUnknown);
    }

    #[test]
    fn lower_income_never_starts_shorter() {
        let policy = NegotiationPolicy::default();
        let high = policy.starting_term(IncomeTier::High);
        let mid = policy.starting_term(IncomeTier::Mid);
        let low = policy.starting_term(IncomeTier::LowOrUnknown);
        assert!(high <= mid && mid <= low);
    }
}
