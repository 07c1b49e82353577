//! Negotiation policy configuration
//!
//! Environment-facing mirror of the domain `NegotiationPolicy`: dollar
//! thresholds come in as whole dollars and are converted to the
//! integer-cent domain type.

use serde::Deserialize;

use crate::domain::foundation::Money;
use crate::domain::negotiation::NegotiationPolicy;

use super::error::ValidationError;

/// Negotiation policy knobs
#[derive(Debug, Clone, Deserialize)]
pub struct NegotiationConfig {
    /// Maximum term without approved hardship (months)
    #[serde(default = "default_base_term_cap")]
    pub base_term_cap: u32,

    /// Maximum term with approved hardship (months)
    #[serde(default = "default_extended_term_cap")]
    pub extended_term_cap: u32,

    /// Opening term for high-tier income (months)
    #[serde(default = "default_starting_term_high")]
    pub starting_term_high: u32,

    /// Opening term for mid-tier income (months)
    #[serde(default = "default_starting_term_mid")]
    pub starting_term_mid: u32,

    /// Opening term for low or unknown income (months)
    #[serde(default = "default_starting_term_fallback")]
    pub starting_term_fallback: u32,

    /// Months added per resisting turn
    #[serde(default = "default_widen_step")]
    pub widen_step_months: u32,

    /// High income tier threshold (whole dollars per month)
    #[serde(default = "default_high_income")]
    pub high_income_threshold_dollars: i64,

    /// Mid income tier threshold (whole dollars per month)
    #[serde(default = "default_mid_income")]
    pub mid_income_threshold_dollars: i64,

    /// Bare figures at or above this are ambiguous (whole dollars)
    #[serde(default = "default_ambiguity")]
    pub income_ambiguity_threshold_dollars: i64,
}

impl NegotiationConfig {
    /// Converts to the domain policy object.
    pub fn to_policy(&self) -> NegotiationPolicy {
        NegotiationPolicy {
            high_income_threshold: Money::from_dollars(self.high_income_threshold_dollars),
            mid_income_threshold: Money::from_dollars(self.mid_income_threshold_dollars),
            base_term_cap: self.base_term_cap,
            extended_term_cap: self.extended_term_cap,
            starting_term_high: self.starting_term_high,
            starting_term_mid: self.starting_term_mid,
            starting_term_fallback: self.starting_term_fallback,
            widen_step_months: self.widen_step_months,
            income_ambiguity_threshold: Money::from_dollars(
                self.income_ambiguity_threshold_dollars,
            ),
        }
    }

    /// Validate negotiation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.to_policy()
            .validate()
            .map_err(|e| ValidationError::InvalidPolicy(e.to_string()))
    }
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            base_term_cap: default_base_term_cap(),
            extended_term_cap: default_extended_term_cap(),
            starting_term_high: default_starting_term_high(),
            starting_term_mid: default_starting_term_mid(),
            starting_term_fallback: default_starting_term_fallback(),
            widen_step_months: default_widen_step(),
            high_income_threshold_dollars: default_high_income(),
            mid_income_threshold_dollars: default_mid_income(),
            income_ambiguity_threshold_dollars: default_ambiguity(),
        }
    }
}

fn default_base_term_cap() -> u32 {
    12
}

fn default_extended_term_cap() -> u32 {
    24
}

fn default_starting_term_high() -> u32 {
    3
}

fn default_starting_term_mid() -> u32 {
    6
}

fn default_starting_term_fallback() -> u32 {
    12
}

fn default_widen_step() -> u32 {
    3
}

fn default_high_income() -> i64 {
    5_000
}

fn default_mid_income() -> i64 {
    2_500
}

fn default_ambiguity() -> i64 {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain_defaults() {
        let config = NegotiationConfig::default();
        assert_eq!(config.to_policy(), NegotiationPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inconsistent_caps_fail_validation() {
        let config = NegotiationConfig {
            extended_term_cap: 6,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPolicy(_))
        ));
    }
}
