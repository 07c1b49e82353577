//! ProcessTurnHandler - one self-contained negotiation turn.
//!
//! Each turn is planned deterministically first: signals are read from
//! the user's message, state transitions are decided, and the exact
//! reply content (figures included) is composed from the calculator and
//! the offer policy. The model is then asked to phrase that content;
//! its output is reconciled, and if it is unavailable the deterministic
//! reply ships as-is. The user never sees a dead end.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::negotiation::income::{self, IncomeSignal};
use crate::domain::negotiation::reconciler::counter_offer_text;
use crate::domain::negotiation::{
    HardshipDocument, HardshipGate, HardshipStatus, InstallmentSchedule, NegotiationPhase,
    NegotiationPolicy, NegotiationSession, OfferContext, OfferPolicy, OfferRationale,
    PaymentLink, ProposedOffer, ResponseReconciler, TurnSignals,
};
use crate::domain::foundation::SessionId;
use crate::ports::{
    AIProvider, CompletionRequest, DocumentClassifier, MessageRole, RequestMetadata,
    SessionStore, SessionStoreError,
};

use super::submit_documents::review_batch;

/// How much history the model sees per turn.
const HISTORY_WINDOW: usize = 20;

/// Command for one session turn.
#[derive(Debug, Clone)]
pub struct ProcessTurnCommand {
    pub session_id: SessionId,
    pub user_message: String,
    pub uploaded_documents: Vec<HardshipDocument>,
}

/// Result of one session turn.
#[derive(Debug, Clone)]
pub struct ProcessTurnResult {
    pub response_text: String,
    pub agreement_reached: bool,
    pub hardship_approved: bool,
}

/// Error type for turn processing.
#[derive(Debug, thiserror::Error)]
pub enum ProcessTurnError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("turn carries neither a message nor documents")]
    EmptyTurn,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SessionStoreError> for ProcessTurnError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => ProcessTurnError::NotFound(id),
            other => ProcessTurnError::Storage(other.to_string()),
        }
    }
}

/// The deterministic plan for a turn, fixed before the model is called.
#[derive(Debug, Clone)]
struct TurnPlan {
    next_phase: NegotiationPhase,
    /// Authoritative reply content; doubles as the fallback response.
    reply: String,
}

/// Handler orchestrating negotiation turns.
pub struct ProcessTurnHandler {
    store: Arc<dyn SessionStore>,
    provider: Arc<dyn AIProvider>,
    classifier: Arc<dyn DocumentClassifier>,
    policy: NegotiationPolicy,
    offer_policy: OfferPolicy,
    reconciler: ResponseReconciler,
    gate: HardshipGate,
    model_timeout: Duration,
    classifier_timeout: Duration,
}

impl ProcessTurnHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn AIProvider>,
        classifier: Arc<dyn DocumentClassifier>,
        policy: NegotiationPolicy,
        model_timeout: Duration,
        classifier_timeout: Duration,
    ) -> Self {
        let offer_policy = OfferPolicy::new(policy.clone());
        let reconciler = ResponseReconciler::new(&policy);
        let gate = HardshipGate::new(&policy);
        Self {
            store,
            provider,
            classifier,
            policy,
            offer_policy,
            reconciler,
            gate,
            model_timeout,
            classifier_timeout,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessTurnCommand,
    ) -> Result<ProcessTurnResult, ProcessTurnError> {
        if cmd.user_message.trim().is_empty() && cmd.uploaded_documents.is_empty() {
            return Err(ProcessTurnError::EmptyTurn);
        }

        let mut session = self.store.load(cmd.session_id).await?;

        // Documents first: an upload in this turn can raise the cap for
        // the very offer this turn produces.
        if !cmd.uploaded_documents.is_empty() {
            let outcome = review_batch(
                self.classifier.as_ref(),
                &cmd.uploaded_documents,
                self.classifier_timeout,
            )
            .await;
            session.apply_hardship_review(&self.gate, &outcome);
        }

        if !cmd.user_message.trim().is_empty() {
            session.record_user_message(cmd.user_message.trim());
        }

        // Terminal phase: acknowledge, never recalculate
        if session.is_completed() {
            let reply = completed_acknowledgement(&session);
            session.record_assistant_message(&reply);
            self.store.save(&session).await?;
            return Ok(ProcessTurnResult {
                response_text: reply,
                agreement_reached: true,
                hardship_approved: session.hardship() == HardshipStatus::Approved,
            });
        }

        let signals = TurnSignals::detect(&cmd.user_message, &self.policy);
        let plan = self.plan_turn(&mut session, &cmd.user_message, &signals)?;

        session
            .advance_phase(plan.next_phase)
            .map_err(|e| ProcessTurnError::Internal(e.to_string()))?;

        // Presentation pass: the model rephrases the planned content.
        // Failure or timeout falls back to the plan itself.
        let response_text = match self.present(&session, &plan).await {
            Some(model_text) => {
                self.reconciler
                    .reconcile(&model_text, session.debt(), session.hardship())
            }
            None => plan.reply.clone(),
        };

        // Agreement is reached exactly when the outgoing text carries a
        // well-formed payment link.
        if !session.is_completed() {
            if let Some(located) = PaymentLink::locate(&response_text) {
                if let Some(link) = located.link {
                    let schedule =
                        InstallmentSchedule::compute(session.debt(), link.term_length)
                            .map_err(|e| ProcessTurnError::Internal(e.to_string()))?;
                    session
                        .complete(schedule)
                        .map_err(|e| ProcessTurnError::Internal(e.to_string()))?;
                }
            }
        }

        session.record_assistant_message(&response_text);
        self.store.save(&session).await?;

        tracing::info!(
            session_id = %session.id(),
            phase = session.phase().label(),
            agreement = session.is_completed(),
            "turn processed"
        );

        Ok(ProcessTurnResult {
            response_text,
            agreement_reached: session.is_completed(),
            hardship_approved: session.hardship() == HardshipStatus::Approved,
        })
    }

    // ────────────────────────────────────────────────────────────────────
    // Deterministic planning
    // ────────────────────────────────────────────────────────────────────

    fn plan_turn(
        &self,
        session: &mut NegotiationSession,
        user_message: &str,
        signals: &TurnSignals,
    ) -> Result<TurnPlan, ProcessTurnError> {
        match session.phase() {
            NegotiationPhase::Initial => self.plan_initial(session, signals),
            NegotiationPhase::AwaitingIncome => {
                self.plan_awaiting_income(session, user_message, signals)
            }
            NegotiationPhase::Negotiating => self.plan_negotiating(session, signals),
            NegotiationPhase::Completed => Ok(TurnPlan {
                next_phase: NegotiationPhase::Completed,
                reply: completed_acknowledgement(session),
            }),
        }
    }

    fn plan_initial(
        &self,
        session: &mut NegotiationSession,
        signals: &TurnSignals,
    ) -> Result<TurnPlan, ProcessTurnError> {
        // A concrete term request outranks the yes/no reading of the turn
        if signals.requested_term.is_some() {
            return self.plan_negotiating(session, signals);
        }
        if signals.declines || signals.resists {
            return Ok(TurnPlan {
                next_phase: NegotiationPhase::AwaitingIncome,
                reply: "That's alright - we can set up a payment plan instead. To find \
                        terms that fit, what is your monthly income?"
                    .to_string(),
            });
        }
        if signals.agrees {
            let schedule = self.compute(session, 1)?;
            return Ok(self.completion_plan(session, &schedule, "Wonderful."));
        }
        Ok(TurnPlan {
            next_phase: NegotiationPhase::Initial,
            reply: format!(
                "Just so I set this up right: are you able to pay the full {} \
                 balance today, or would a payment plan help?",
                session.debt()
            ),
        })
    }

    fn plan_awaiting_income(
        &self,
        session: &mut NegotiationSession,
        user_message: &str,
        signals: &TurnSignals,
    ) -> Result<TurnPlan, ProcessTurnError> {
        // A fully-qualified figure wins; a bare clarification ("that's
        // yearly") resolves the amount already on file.
        let resolved = signals
            .income
            .and_then(|signal| signal.to_monthly())
            .or_else(|| {
                session.pending_income().and_then(|pending| {
                    income::resolve_clarification(user_message, pending)
                        .and_then(|signal| signal.to_monthly())
                })
            });

        if let Some(estimate) = resolved {
            session.set_income(estimate);
            return self.plan_negotiating(session, signals);
        }

        if let Some(IncomeSignal::Ambiguous(amount)) = signals.income {
            session.set_pending_income(amount);
            return Ok(TurnPlan {
                next_phase: NegotiationPhase::AwaitingIncome,
                reply: format!(
                    "Thanks. Quick check so I get this right: is {} your monthly \
                     or your annual income?",
                    amount
                ),
            });
        }

        if signals.requested_term.is_some() {
            return self.plan_negotiating(session, signals);
        }

        let reply = if let Some(pending) = session.pending_income() {
            format!(
                "Sorry to press, but I need to know: is the {} you mentioned \
                 monthly or annual?",
                pending
            )
        } else {
            "To tailor a plan to your situation, could you share your monthly \
             income? A rough figure is fine."
                .to_string()
        };

        Ok(TurnPlan {
            next_phase: NegotiationPhase::AwaitingIncome,
            reply,
        })
    }

    fn plan_negotiating(
        &self,
        session: &mut NegotiationSession,
        signals: &TurnSignals,
    ) -> Result<TurnPlan, ProcessTurnError> {
        // Acceptance of the standing offer seals the deal. A different
        // term named alongside the "yes" is a request, not acceptance.
        if signals.agrees && !signals.resists {
            if let Some(term) = session.offered_term() {
                let accepts_standing = signals
                    .requested_term
                    .map_or(true, |requested| requested == term);
                if accepts_standing {
                    let schedule = self.compute(session, term)?;
                    return Ok(self.completion_plan(session, &schedule, "Excellent."));
                }
            }
        }

        let ctx = OfferContext {
            hardship: session.hardship(),
            income: session.income(),
            requested_term: signals.requested_term,
            previous_term: session.offered_term(),
            resists: signals.resists,
        };
        let offer = self
            .offer_policy
            .propose(session.debt(), &ctx)
            .map_err(|e| ProcessTurnError::Internal(e.to_string()))?;

        session.note_offer(offer.term_length);

        // An in-cap request is accepted outright, schedule and link included
        if offer.rationale == OfferRationale::HonoredRequest {
            return Ok(self.completion_plan(session, &offer.schedule, "Done."));
        }

        Ok(TurnPlan {
            next_phase: NegotiationPhase::Negotiating,
            reply: offer_reply(session, &offer),
        })
    }

    fn completion_plan(
        &self,
        session: &NegotiationSession,
        schedule: &InstallmentSchedule,
        opener: &str,
    ) -> TurnPlan {
        let link = PaymentLink::from_schedule(session.debt(), schedule);
        TurnPlan {
            // complete() performs the transition once the link is confirmed
            // in the outgoing text
            next_phase: session.phase(),
            reply: format!(
                "{} {} settles your {} balance in full. Here is your payment \
                 link: {}",
                opener,
                capitalize(&schedule.describe()),
                session.debt(),
                link.render()
            ),
        }
    }

    fn compute(
        &self,
        session: &NegotiationSession,
        term: u32,
    ) -> Result<InstallmentSchedule, ProcessTurnError> {
        InstallmentSchedule::compute(session.debt(), term)
            .map_err(|e| ProcessTurnError::Internal(e.to_string()))
    }

    // ────────────────────────────────────────────────────────────────────
    // Presentation pass
    // ────────────────────────────────────────────────────────────────────

    /// Asks the model to phrase the planned content. Returns `None` on
    /// any failure or timeout; the caller falls back to the plan.
    async fn present(&self, session: &NegotiationSession, plan: &TurnPlan) -> Option<String> {
        let metadata = RequestMetadata::new(
            session.id(),
            format!("turn-{}", session.turn_count()),
        );

        let mut request = CompletionRequest::new(metadata)
            .with_system_prompt(self.build_system_prompt(session, plan))
            .with_max_tokens(400)
            .with_temperature(0.7);

        let history = session.history();
        let window_start = history.len().saturating_sub(HISTORY_WINDOW);
        for message in &history[window_start..] {
            let role = match message.role {
                crate::domain::negotiation::ChatRole::User => MessageRole::User,
                crate::domain::negotiation::ChatRole::Assistant => MessageRole::Assistant,
            };
            request = request.with_message(role, message.content.clone());
        }

        match tokio::time::timeout(self.model_timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => Some(response.content),
            Ok(Err(err)) => {
                tracing::warn!(
                    session_id = %session.id(),
                    error = %err,
                    "model call failed; using deterministic reply"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    session_id = %session.id(),
                    timeout_secs = self.model_timeout.as_secs(),
                    "model call timed out; using deterministic reply"
                );
                None
            }
        }
    }

    fn build_system_prompt(&self, session: &NegotiationSession, plan: &TurnPlan) -> String {
        format!(
            "You are a courteous debt-settlement assistant.\n\
             Directive: {}\n\
             Total debt: {} (fixed; never change it).\n\
             Hardship documentation: {:?}. The longest term you may mention is {} months.\n\
             \n\
             The content of your next reply has already been decided:\n\
             ---\n{}\n---\n\
             Rephrase it warmly in at most three sentences. Keep every dollar \
             amount, every month count, and any paylink:// string exactly as \
             written. Do not invent figures, plans, or promises.",
            plan.next_phase.directive(),
            session.debt(),
            session.hardship(),
            self.gate.max_allowed_term(session.hardship()),
            plan.reply,
        )
    }
}

// ────────────────────────────────────────────────────────────────────────
// Reply templates
// ────────────────────────────────────────────────────────────────────────

fn offer_reply(session: &NegotiationSession, offer: &ProposedOffer) -> String {
    match offer.rationale {
        OfferRationale::Opening { .. } => format!(
            "Here's what I can do: {}, settling the full {} balance. Does \
             that work for you?",
            offer.schedule.describe(),
            session.debt()
        ),
        OfferRationale::Widened => format!(
            "I understand. Let's ease the monthly load: {}. Would that be \
             manageable?",
            offer.schedule.describe()
        ),
        OfferRationale::Standing => format!(
            "The offer on the table is {}. Want me to lock it in?",
            offer.schedule.describe()
        ),
        OfferRationale::CappedForDocumentation { .. } => {
            counter_offer_text(&offer.schedule, true)
        }
        OfferRationale::CappedAtExtended { .. } => counter_offer_text(&offer.schedule, false),
        // Completion path; handled before this template is reached
        OfferRationale::HonoredRequest => offer.schedule.describe(),
    }
}

fn completed_acknowledgement(session: &NegotiationSession) -> String {
    match session.final_schedule() {
        Some(schedule) => format!(
            "You're all set - your plan of {} is locked in. Use the payment \
             link from our agreement whenever you're ready.",
            schedule.describe()
        ),
        None => "You're all set - your payment plan is locked in. Use the \
                 payment link from our agreement whenever you're ready."
            .to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::adapters::classifier::MockClassifier;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::foundation::Money;

    struct Fixture {
        handler: ProcessTurnHandler,
        store: Arc<InMemorySessionStore>,
        session_id: SessionId,
    }

    async fn fixture(provider: MockAIProvider, classifier: MockClassifier) -> Fixture {
        let store = Arc::new(InMemorySessionStore::new());
        let session = NegotiationSession::new(Money::from_dollars(2400)).unwrap();
        let session_id = session.id();
        store.save(&session).await.unwrap();

        let handler = ProcessTurnHandler::new(
            store.clone(),
            Arc::new(provider),
            Arc::new(classifier),
            NegotiationPolicy::default(),
            Duration::from_millis(200),
            Duration::from_millis(200),
        );

        Fixture {
            handler,
            store,
            session_id,
        }
    }

    fn turn(session_id: SessionId, message: &str) -> ProcessTurnCommand {
        ProcessTurnCommand {
            session_id,
            user_message: message.to_string(),
            uploaded_documents: vec![],
        }
    }

    #[tokio::test]
    async fn decline_moves_to_awaiting_income() {
        // Model is down; deterministic path drives the whole turn
        let f = fixture(
            MockAIProvider::new().with_error(MockError::Unavailable {
                message: "down".into(),
            }),
            MockClassifier::new(),
        )
        .await;

        let result = f
            .handler
            .handle(turn(f.session_id, "No, I can't pay all of that"))
            .await
            .unwrap();

        assert!(!result.agreement_reached);
        assert!(result.response_text.contains("monthly income"));

        let session = f.store.load(f.session_id).await.unwrap();
        assert_eq!(session.phase(), NegotiationPhase::AwaitingIncome);
    }

    #[tokio::test]
    async fn empty_turn_is_rejected() {
        let f = fixture(MockAIProvider::new(), MockClassifier::new()).await;
        let result = f.handler.handle(turn(f.session_id, "   ")).await;
        assert!(matches!(result, Err(ProcessTurnError::EmptyTurn)));
    }

    #[tokio::test]
    async fn model_reply_is_reconciled_before_surfacing() {
        // The model "agrees" to 7 months but botches the arithmetic
        let f = fixture(
            MockAIProvider::new()
                .with_error(MockError::Unavailable { message: "x".into() })
                .with_response("Sure! 7 months at $342.86 per month sounds right."),
            MockClassifier::new(),
        )
        .await;

        // Turn 1 (fallback): decline -> income question
        f.handler
            .handle(turn(f.session_id, "no, I can't"))
            .await
            .unwrap();

        // Turn 2: income arrives; model responds with bad arithmetic
        let result = f
            .handler
            .handle(turn(f.session_id, "I make $3200 a month"))
            .await
            .unwrap();

        assert!(result.response_text.contains("$342.85"));
        assert!(!result.response_text.contains("$342.86"));
    }
}
