//! Money value object backed by integer cents.
//!
//! All currency arithmetic in the negotiation core runs on integer cents
//! to avoid binary floating point drift. Decimal-dollar strings appear
//! only at the boundary (parsing user/config input, formatting output).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that occur when parsing a decimal dollar amount.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoneyParseError {
    #[error("Empty amount")]
    Empty,

    #[error("Invalid amount '{raw}': {reason}")]
    Invalid { raw: String, reason: String },

    #[error("Amount '{raw}' has more than two decimal places")]
    TooManyDecimals { raw: String },
}

/// A currency amount held as integer cents.
///
/// `Money` is `Copy` and totally ordered; arithmetic helpers are explicit
/// methods rather than operator overloads so call sites read as money
/// manipulation, matching how the rest of the domain treats value objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero dollars.
    pub const ZERO: Money = Money(0);

    /// Creates a Money from integer cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates a Money from whole dollars.
    pub fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    /// Returns the amount in integer cents.
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Adds another amount.
    pub fn plus(&self, other: Money) -> Money {
        Money(self.0 + other.0)
    }

    /// Subtracts another amount. May go negative; callers check.
    pub fn minus(&self, other: Money) -> Money {
        Money(self.0 - other.0)
    }

    /// Multiplies by a count of installments.
    pub fn times(&self, n: u32) -> Money {
        Money(self.0 * i64::from(n))
    }

    /// Divides by a count, truncating toward zero at the cent.
    pub fn div_floor(&self, n: u32) -> Money {
        Money(self.0 / i64::from(n))
    }

    /// Formats as a bare decimal string without currency symbol, e.g. `2400.00`.
    ///
    /// This is the wire format for decimal-dollar fields.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl fmt::Display for Money {
    /// Renders with a dollar sign, e.g. `$342.85`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-${}", Money(-self.0).to_decimal_string())
        } else {
            write!(f, "${}", self.to_decimal_string())
        }
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    /// Parses a decimal dollar amount such as `2400`, `2400.5`, `2400.00`,
    /// `$2,400.00`. At most two decimal places are accepted; a cents field
    /// must never carry a decimal amount, so no rounding happens here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| *c != '$' && *c != ',')
            .collect();

        if cleaned.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if frac.len() > 2 {
            return Err(MoneyParseError::TooManyDecimals { raw: s.to_string() });
        }
        if whole.is_empty() && frac.is_empty() {
            return Err(MoneyParseError::Invalid {
                raw: s.to_string(),
                reason: "no digits".to_string(),
            });
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(MoneyParseError::Invalid {
                raw: s.to_string(),
                reason: "non-numeric characters".to_string(),
            });
        }

        let whole_cents: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse::<i64>().map_err(|e| MoneyParseError::Invalid {
                raw: s.to_string(),
                reason: e.to_string(),
            })? * 100
        };

        // "2400.5" means fifty cents, not five
        let frac_cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().unwrap_or(0) * 10,
            _ => frac.parse::<i64>().unwrap_or(0),
        };

        let cents = whole_cents + frac_cents;
        Ok(Money(if negative { -cents } else { cents }))
    }
}
