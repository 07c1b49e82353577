//! Penny-exact installment schedule computation.
//!
//! The single authority for payment-plan arithmetic. Every schedule the
//! service surfaces is recomputed here from integer cents; schedules are
//! never reconstructed from text produced by the model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::Money;

/// Errors from schedule computation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("term length must be at least 1, got {term}")]
    InvalidTerm { term: u32 },
}

/// A derived, immutable payment plan: `base_count` payments of
/// `base_amount` followed by one `final_amount` payment.
///
/// Invariant: `base_amount * base_count + final_amount` equals the debt
/// to the cent. The final payment absorbs all rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentSchedule {
    /// Total number of monthly installments.
    pub term_length: u32,
    /// Per-installment amount for all but the last installment.
    pub base_amount: Money,
    /// Number of base payments, always `term_length - 1`.
    pub base_count: u32,
    /// Last installment, sized so the total matches the debt exactly.
    pub final_amount: Money,
}

impl InstallmentSchedule {
    /// Computes the schedule for a debt split over `term_length` months.
    ///
    /// Integer-cent algorithm: the base payment is the even division
    /// truncated downward at the cent; the final payment is whatever
    /// remains. A term of 1 is a single payment of the full debt.
    ///
    /// Degenerate inputs (a term far larger than the cent granularity of
    /// the debt allows) still return the formula's result; that situation
    /// signals a caller bug, not a calculator bug.
    pub fn compute(debt: Money, term_length: u32) -> Result<Self, ScheduleError> {
        if term_length < 1 {
            return Err(ScheduleError::InvalidTerm { term: term_length });
        }

        if term_length == 1 {
            return Ok(Self {
                term_length: 1,
                base_amount: Money::ZERO,
                base_count: 0,
                final_amount: debt,
            });
        }

        let base = debt.div_floor(term_length);
        let base_count = term_length - 1;
        let final_amount = debt.minus(base.times(base_count));

        let schedule = Self {
            term_length,
            base_amount: base,
            base_count,
            final_amount,
        };
        debug_assert_eq!(schedule.total().cents(), debt.cents());
        Ok(schedule)
    }

    /// Sum of all installments; equals the debt to the cent.
    pub fn total(&self) -> Money {
        self.base_amount.times(self.base_count).plus(self.final_amount)
    }

    /// True when every installment is the same amount.
    pub fn is_even_split(&self) -> bool {
        self.base_count == 0 || self.final_amount == self.base_amount
    }

    /// User-facing prose for this schedule.
    pub fn describe(&self) -> String {
        if self.base_count == 0 {
            format!("a single payment of {}", self.final_amount)
        } else if self.is_even_split() {
            format!(
                "{} monthly payments of {}",
                self.term_length, self.base_amount
            )
        } else {
            format!(
                "{} monthly payments of {} followed by a final payment of {}",
                self.base_count, self.base_amount, self.final_amount
            )
        }
    }
}
