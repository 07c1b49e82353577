//! Machine-parseable payment link emitted when terms are agreed.
//!
//! The link is a URL-query-like string consumed by the chat UI. Cent
//! fields carry exact integer cents; only `totalDebtAmount` is decimal
//! dollars. A link parsed back always reproduces the schedule the
//! calculator computes for its term length and debt.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::Money;
use crate::domain::negotiation::schedule::InstallmentSchedule;

/// Scheme prefix every payment link starts with.
pub const PAYMENT_LINK_PREFIX: &str = "paylink://agree?";

/// Characters allowed inside a rendered link.
const LINK_CHARS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789&=._%-";

/// Errors from parsing a payment link string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkParseError {
    #[error("not a payment link")]
    NotALink,

    #[error("payment link missing field '{name}'")]
    MissingField { name: &'static str },

    #[error("payment link field '{name}' has invalid value '{value}'")]
    InvalidField { name: &'static str, value: String },
}

/// The structured content of a payment link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLink {
    pub term_length: u32,
    pub total_debt: Money,
    pub term_payment: Money,
    pub final_payment: Money,
}

/// A payment-link-shaped substring found in free text, with its byte
/// range and the parse result (`None` when malformed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedPaymentLink {
    pub start: usize,
    pub end: usize,
    pub link: Option<PaymentLink>,
}

impl PaymentLink {
    /// Builds a link from an authoritative schedule.
    ///
    /// For a single-payment plan the term payment field repeats the final
    /// payment; there is no separate base installment to report.
    pub fn from_schedule(debt: Money, schedule: &InstallmentSchedule) -> Self {
        let term_payment = if schedule.base_count == 0 {
            schedule.final_amount
        } else {
            schedule.base_amount
        };
        Self {
            term_length: schedule.term_length,
            total_debt: debt,
            term_payment,
            final_payment: schedule.final_amount,
        }
    }

    /// Renders the wire form of the link.
    pub fn render(&self) -> String {
        format!(
            "{}termLength={}&totalDebtAmount={}&termPaymentAmount={}&finalPaymentAmount={}",
            PAYMENT_LINK_PREFIX,
            self.term_length,
            self.total_debt.to_decimal_string(),
            self.term_payment.cents(),
            self.final_payment.cents(),
        )
    }

    /// Parses a full link string (prefix included).
    pub fn parse(s: &str) -> Result<Self, LinkParseError> {
        let query = s.strip_prefix(PAYMENT_LINK_PREFIX).ok_or(LinkParseError::NotALink)?;

        let mut term_length = None;
        let mut total_debt = None;
        let mut term_payment = None;
        let mut final_payment = None;

        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "termLength" => {
                    term_length = Some(value.parse::<u32>().map_err(|_| {
                        LinkParseError::InvalidField {
                            name: "termLength",
                            value: value.to_string(),
                        }
                    })?);
                }
                "totalDebtAmount" => {
                    total_debt =
                        Some(value.parse::<Money>().map_err(|_| LinkParseError::InvalidField {
                            name: "totalDebtAmount",
                            value: value.to_string(),
                        })?);
                }
                "termPaymentAmount" => {
                    term_payment = Some(parse_cents_field("termPaymentAmount", value)?);
                }
                "finalPaymentAmount" => {
                    final_payment = Some(parse_cents_field("finalPaymentAmount", value)?);
                }
                _ => {}
            }
        }

        Ok(Self {
            term_length: term_length.ok_or(LinkParseError::MissingField { name: "termLength" })?,
            total_debt: total_debt
                .ok_or(LinkParseError::MissingField { name: "totalDebtAmount" })?,
            term_payment: term_payment
                .ok_or(LinkParseError::MissingField { name: "termPaymentAmount" })?,
            final_payment: final_payment
                .ok_or(LinkParseError::MissingField { name: "finalPaymentAmount" })?,
        })
    }

    /// Finds the first payment-link-shaped substring in free text.
    ///
    /// The byte range covers the whole link-shaped token even when it is
    /// malformed, so a caller can splice in a corrected link.
    pub fn locate(text: &str) -> Option<LocatedPaymentLink> {
        let start = text.find(PAYMENT_LINK_PREFIX)?;
        let query_start = start + PAYMENT_LINK_PREFIX.len();
        let tail = &text[query_start..];
        let mut end = query_start
            + tail
                .char_indices()
                .find(|(_, c)| !LINK_CHARS.contains(*c))
                .map(|(i, _)| i)
                .unwrap_or(tail.len());

        // Sentence punctuation glued to the link is not part of it
        while end > query_start && matches!(text.as_bytes()[end - 1], b'.' | b',' | b'-') {
            end -= 1;
        }

        let link = PaymentLink::parse(&text[start..end]).ok();
        Some(LocatedPaymentLink { start, end, link })
    }

    /// True when the link's figures match an authoritative schedule.
    pub fn matches_schedule(&self, debt: Money, schedule: &InstallmentSchedule) -> bool {
        self.term_length == schedule.term_length
            && self.total_debt == debt
            && self.final_payment == schedule.final_amount
            && (schedule.base_count == 0 || self.term_payment == schedule.base_amount)
    }
}

/// Cents fields must never carry a decimal amount.
fn parse_cents_field(name: &'static str, value: &str) -> Result<Money, LinkParseError> {
    if value.contains('.') {
        return Err(LinkParseError::InvalidField {
            name,
            value: value.to_string(),
        });
    }
    value
        .parse::<i64>()
        .map(Money::from_cents)
        .map_err(|_| LinkParseError::InvalidField {
            name,
            value: value.to_string(),
        })
}
