//! Income estimate parsing from user-declared figures.
//!
//! A figure only becomes an estimate when its monthly/annual basis is
//! known. Bare numbers above the ambiguity threshold and "K"-suffixed
//! numbers are never silently classified; they force one clarifying
//! round-trip before negotiation proceeds.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Money;
use crate::domain::negotiation::policy::NegotiationPolicy;

/// A resolved monthly income estimate.
///
/// Set once per session, may be corrected by a later clarifying answer,
/// never expires mid-session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeEstimate {
    pub monthly: Money,
}

impl IncomeEstimate {
    pub fn new(monthly: Money) -> Self {
        Self { monthly }
    }
}

/// An income figure detected in user text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeSignal {
    /// Explicitly monthly, or a bare figure below the ambiguity threshold.
    Monthly(Money),
    /// Explicitly annual; divide by twelve to estimate.
    Annual(Money),
    /// Magnitude is plausible as either basis; must be clarified.
    Ambiguous(Money),
}

impl IncomeSignal {
    /// Resolves to a monthly estimate, or `None` when still ambiguous.
    pub fn to_monthly(&self) -> Option<IncomeEstimate> {
        match self {
            IncomeSignal::Monthly(amount) => Some(IncomeEstimate::new(*amount)),
            IncomeSignal::Annual(amount) => Some(IncomeEstimate::new(amount.div_floor(12))),
            IncomeSignal::Ambiguous(_) => None,
        }
    }
}

static MONTHLY_WORDS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["month", "monthly", "mo"]);

static ANNUAL_WORDS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["year", "yearly", "annual", "annually", "yr"]);

/// Words that mark a number as a duration, not an income figure.
static DURATION_WORDS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["months", "installments", "payments", "weeks"]);

/// Scans user text for a declared income figure.
///
/// Returns the first number that reads as an income amount, classified
/// by any monthly/annual qualifier within a few words of it.
pub fn detect_income(text: &str, policy: &NegotiationPolicy) -> Option<IncomeSignal> {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| ",.!?;:()".contains(c)).to_lowercase())
        .collect();

    for (i, token) in tokens.iter().enumerate() {
        // Tokens like "4500/month" carry their own qualifier
        let (number_part, inline_qualifier) = match token.split_once('/') {
            Some((n, q)) => (n, Some(q)),
            None => (token.as_str(), None),
        };

        let Some((amount, k_suffixed)) = parse_amount(number_part) else {
            continue;
        };

        // "6 months" is a term length, not income
        if tokens
            .get(i + 1)
            .is_some_and(|next| DURATION_WORDS.contains(&next.as_str()))
        {
            continue;
        }

        let qualifier = inline_qualifier
            .map(classify_qualifier)
            .unwrap_or(Qualifier::None);
        let qualifier = match qualifier {
            Qualifier::None => window_qualifier(&tokens, i),
            found => found,
        };

        return Some(match qualifier {
            Qualifier::Monthly => IncomeSignal::Monthly(amount),
            Qualifier::Annual => IncomeSignal::Annual(amount),
            Qualifier::None if k_suffixed => IncomeSignal::Ambiguous(amount),
            Qualifier::None if amount >= policy.income_ambiguity_threshold => {
                IncomeSignal::Ambiguous(amount)
            }
            Qualifier::None => IncomeSignal::Monthly(amount),
        });
    }

    None
}

/// Resolves a pending ambiguous amount from a clarifying answer.
///
/// The answer only needs to name the basis ("monthly" / "that's per
/// year"); the amount is the one already on file.
pub fn resolve_clarification(text: &str, pending: Money) -> Option<IncomeSignal> {
    let lower = text.to_lowercase();
    for token in lower
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| ",.!?;:()".contains(c)))
    {
        let token = token.split('/').last().unwrap_or(token);
        if MONTHLY_WORDS.contains(&token) {
            return Some(IncomeSignal::Monthly(pending));
        }
        if ANNUAL_WORDS.contains(&token) {
            return Some(IncomeSignal::Annual(pending));
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Qualifier {
    Monthly,
    Annual,
    None,
}

fn classify_qualifier(word: &str) -> Qualifier {
    if MONTHLY_WORDS.contains(&word) {
        Qualifier::Monthly
    } else if ANNUAL_WORDS.contains(&word) {
        Qualifier::Annual
    } else {
        Qualifier::None
    }
}

/// Looks for a basis qualifier up to three words after and one before
/// the number ("I make $4500 a month", "monthly 3200 after taxes").
fn window_qualifier(tokens: &[String], index: usize) -> Qualifier {
    let after = tokens.iter().skip(index + 1).take(3);
    let before = tokens.get(index.wrapping_sub(1)).into_iter();
    for word in after.chain(before) {
        match classify_qualifier(word.as_str()) {
            Qualifier::None => continue,
            found => return found,
        }
    }
    Qualifier::None
}

/// Parses a money token, returning the amount and whether it carried a
/// thousands suffix ("55k").
fn parse_amount(token: &str) -> Option<(Money, bool)> {
    let cleaned = token.trim_start_matches('$');
    if cleaned.is_empty() {
        return None;
    }

    let (digits, k_suffixed) = match cleaned.strip_suffix(['k', 'K']) {
        Some(rest) => (rest, true),
        None => (cleaned, false),
    };

    // Reject tokens that are not purely numeric ("4am", "k9")
    if digits.is_empty()
        || !digits
            .chars()
            .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
    {
        return None;
    }

    let amount: Money = digits.parse().ok()?;
    if !amount.is_positive() {
        return None;
    }

    Some(if k_suffixed {
        (Money::from_cents(amount.cents() * 1000), true)
    } else {
        (amount, false)
    })
}
