//! Post-processing of model replies.
//!
//! The model is not trusted to do arithmetic or respect term caps. The
//! reconciler re-derives every figure from the calculator and rewrites
//! the reply so nothing inexact or over-cap ever reaches the user. It
//! never fails: anything it cannot parse passes through unchanged.

use crate::domain::foundation::Money;
use crate::domain::negotiation::hardship::{HardshipGate, HardshipStatus};
use crate::domain::negotiation::payment_link::PaymentLink;
use crate::domain::negotiation::policy::NegotiationPolicy;
use crate::domain::negotiation::schedule::InstallmentSchedule;
use crate::domain::negotiation::signals::find_term_mention;

/// Verifies and corrects model output before it is surfaced.
#[derive(Debug, Clone)]
pub struct ResponseReconciler {
    gate: HardshipGate,
}

impl ResponseReconciler {
    pub fn new(policy: &NegotiationPolicy) -> Self {
        Self {
            gate: HardshipGate::new(policy),
        }
    }

    /// Rewrites `raw` so any payment link is penny-exact and any offered
    /// term respects the hardship-gated cap.
    ///
    /// Guarantees: never raises; text with no term and no link passes
    /// through unchanged; an over-cap offer is replaced wholesale with a
    /// capped counter-offer.
    pub fn reconcile(&self, raw: &str, debt: Money, hardship: HardshipStatus) -> String {
        let located = PaymentLink::locate(raw);
        let term = located
            .as_ref()
            .and_then(|l| l.link.as_ref().map(|link| link.term_length))
            .or_else(|| find_term_mention(raw));

        let Some(term) = term else {
            return raw.to_string();
        };

        let cap = self.gate.max_allowed_term(hardship);
        if term > cap {
            let Ok(capped) = InstallmentSchedule::compute(debt, cap) else {
                return raw.to_string();
            };
            return counter_offer_text(&capped, hardship != HardshipStatus::Approved);
        }

        let Ok(schedule) = InstallmentSchedule::compute(debt, term) else {
            return raw.to_string();
        };

        let mut text = raw.to_string();

        // Splice the authoritative link over whatever link-shaped token
        // the model produced, well-formed or not.
        if let Some(located) = located {
            let corrected = PaymentLink::from_schedule(debt, &schedule).render();
            text.replace_range(located.start..located.end, &corrected);
        }

        rewrite_naive_amounts(&mut text, debt, &schedule);
        text
    }
}

/// Counter-offer used when a reply tried to exceed the cap.
///
/// Also used by the deterministic fallback path so over-cap requests get
/// the same wording with or without the model.
pub fn counter_offer_text(capped: &InstallmentSchedule, needs_documentation: bool) -> String {
    if needs_documentation {
        format!(
            "The longest plan I can offer right now is {} months: {}, settling the \
             full {} balance. To qualify for a longer term, please upload \
             documentation of your financial hardship and I'll review it.",
            capped.term_length,
            capped.describe(),
            capped.total(),
        )
    } else {
        format!(
            "Even with hardship documentation on file, the longest plan available \
             is {} months: {}, settling the full {} balance.",
            capped.term_length,
            capped.describe(),
            capped.total(),
        )
    }
}

/// Replaces per-month dollar figures produced by naive even division
/// (rounded or ceiled) with the exact base amount.
fn rewrite_naive_amounts(text: &mut String, debt: Money, schedule: &InstallmentSchedule) {
    if schedule.base_count == 0 {
        return;
    }

    let cents = debt.cents();
    let term = i64::from(schedule.term_length);
    let floor = cents / term;
    let remainder = cents % term;
    let half_up = floor + i64::from(2 * remainder >= term);
    let ceil = floor + i64::from(remainder > 0);

    for candidate in [half_up, ceil] {
        if candidate == schedule.base_amount.cents() {
            continue;
        }
        let wrong = Money::from_cents(candidate).to_string();
        if text.contains(&wrong) {
            *text = text.replace(&wrong, &schedule.base_amount.to_string());
        }
    }
}
