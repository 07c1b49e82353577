//! Deterministic signal detection over user turns.
//!
//! Only the user's own text is scraped, and only for the signals the
//! negotiation rules are defined over: an explicit term request, an
//! income figure, agreement, decline, and affordability resistance.
//! Model output is never mined for ground truth.

use once_cell::sync::Lazy;

use crate::domain::negotiation::income::{detect_income, IncomeSignal};
use crate::domain::negotiation::policy::NegotiationPolicy;

/// Longest term request the scanner will take literally.
const MAX_RECOGNIZED_TERM: u32 = 120;

static AGREE_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["yes", "yep", "yeah", "sure", "deal", "agreed", "accept", "ok", "okay"]
});

static AGREE_PHRASES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "sounds good",
        "works for me",
        "let's do it",
        "lets do it",
        "i agree",
        "i accept",
        "i'll take it",
        "that works",
    ]
});

static DECLINE_WORDS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["no", "nope", "can't", "cant", "cannot", "unable"]);

static RESIST_PHRASES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "too high",
        "too much",
        "too expensive",
        "too steep",
        "can't afford",
        "cant afford",
        "cannot afford",
        "not affordable",
        "out of reach",
    ]
});

static RESIST_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| vec!["lower", "cheaper", "smaller"]);

/// Everything the deterministic layer reads out of one user turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TurnSignals {
    /// An explicit "N months" request, if present.
    pub requested_term: Option<u32>,
    /// A declared income figure, if present.
    pub income: Option<IncomeSignal>,
    /// The user accepted the standing offer or question.
    pub agrees: bool,
    /// The user declined (used for the pay-in-full question).
    pub declines: bool,
    /// A "too high / can't afford" affordability pushback.
    pub resists: bool,
}

impl TurnSignals {
    /// Scans one user message for all recognized signals.
    pub fn detect(text: &str, policy: &NegotiationPolicy) -> Self {
        let lower = text.to_lowercase();

        // "no problem" / "no worries" are agreement idioms, not declines
        let decline_view = lower.replace("no problem", "").replace("no worries", "");
        let decline_words = tokenize(&decline_view);
        let words = tokenize(&lower);

        let resists = RESIST_PHRASES.iter().any(|p| lower.contains(p))
            || RESIST_WORDS.iter().any(|w| words.iter().any(|t| t == w));

        Self {
            requested_term: find_term_mention(text),
            income: detect_income(text, policy),
            agrees: AGREE_PHRASES.iter().any(|p| lower.contains(p))
                || AGREE_WORDS.iter().any(|w| words.iter().any(|t| t == w)),
            declines: DECLINE_WORDS.iter().any(|w| decline_words.iter().any(|t| t == w)),
            resists,
        }
    }
}

/// Finds the first term-length mention in free text.
///
/// Recognizes "7 months", "7 month", "7-month", and "7 monthly
/// payments/installments". Shared with the response reconciler, which
/// runs the same scan over model output.
pub fn find_term_mention(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    let words = tokenize(&lower);

    for (i, word) in words.iter().enumerate() {
        // "7-month" as a single token
        if let Some((n, rest)) = word.split_once('-') {
            if let Ok(term) = n.parse::<u32>() {
                if rest.starts_with("month") && in_range(term) {
                    return Some(term);
                }
            }
            continue;
        }

        let Ok(term) = word.parse::<u32>() else {
            continue;
        };
        if !in_range(term) {
            continue;
        }

        match words.get(i + 1).map(String::as_str) {
            Some("month") | Some("months") => return Some(term),
            Some("monthly") => {
                if matches!(
                    words.get(i + 2).map(String::as_str),
                    Some("payments") | Some("installments") | Some("instalments")
                ) {
                    return Some(term);
                }
            }
            _ => {}
        }
    }

    None
}

fn in_range(term: u32) -> bool {
    (1..=MAX_RECOGNIZED_TERM).contains(&term)
}

fn tokenize(lower: &str) -> Vec<String> {
    lower
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| ",.!?;:()\"".contains(c))
                .to_string()
        })
        .collect()
}
