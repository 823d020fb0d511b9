use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    BookingDraft, BookingRecord, Branding, ConversationState, ExhibitionCatalog, Message, Sender,
    Step,
};
use crate::services::booking_id::BookingIdGenerator;
use crate::services::conversation::{self, Effect};
use crate::services::delay_queue::DelayQueue;
use crate::services::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    pub typing: Duration,
    pub payment: Duration,
}

impl Delays {
    pub fn none() -> Self {
        Self {
            typing: Duration::ZERO,
            payment: Duration::ZERO,
        }
    }
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            typing: Duration::from_millis(1000),
            payment: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    EmptyInput,
    PaymentInProgress,
    Completed,
}

impl IgnoredReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoredReason::EmptyInput => "empty_input",
            IgnoredReason::PaymentInProgress => "payment_in_progress",
            IgnoredReason::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The user message was appended under this id; replies are queued.
    Accepted { message_id: u64 },
    Ignored(IgnoredReason),
}

/// What a drain of the delay queue surfaced.
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    pub appended: Vec<Message>,
    pub completed: Option<BookingRecord>,
}

/// One chat widget instance: the dialogue state, its transcript and the
/// replies still "being typed".
///
/// All time arguments are offsets from the moment the session was created.
pub struct ChatSession {
    id: Uuid,
    state: ConversationState,
    transcript: Transcript,
    pending: DelayQueue<Effect>,
    catalog: Arc<ExhibitionCatalog>,
    branding: Branding,
    ids: Arc<dyn BookingIdGenerator>,
    delays: Delays,
}

impl ChatSession {
    pub fn new(
        catalog: Arc<ExhibitionCatalog>,
        branding: Branding,
        ids: Arc<dyn BookingIdGenerator>,
        delays: Delays,
        preselected: Option<&str>,
    ) -> Self {
        let (state, greeting) = conversation::start(&catalog, &branding, preselected);
        let mut transcript = Transcript::new();
        transcript.append(Sender::Assistant, greeting, Utc::now());

        let id = Uuid::new_v4();
        tracing::info!(session_id = %id, step = state.step().as_str(), "chat session started");

        Self {
            id,
            state,
            transcript,
            pending: DelayQueue::new(),
            catalog,
            branding,
            ids,
            delays,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> Step {
        self.state.step()
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn draft(&self) -> BookingDraft {
        self.state.draft()
    }

    pub fn booking(&self) -> Option<&BookingRecord> {
        self.state.record()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn branding(&self) -> &Branding {
        &self.branding
    }

    /// True while assistant output is scheduled but not yet visible.
    pub fn is_typing(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.pending.next_due()
    }

    /// Feed one user input (typed or a tapped suggestion).
    pub fn submit(&mut self, input: &str, now: Duration) -> SubmitOutcome {
        let text = input.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored(IgnoredReason::EmptyInput);
        }

        let Some(transition) = conversation::transition(&self.state, text, &self.catalog) else {
            let reason = if self.state.step().is_terminal() {
                IgnoredReason::Completed
            } else {
                IgnoredReason::PaymentInProgress
            };
            tracing::debug!(session_id = %self.id, reason = reason.as_str(), "input ignored");
            return SubmitOutcome::Ignored(reason);
        };

        let message_id = self.transcript.append_user(text, Utc::now());
        let from = self.state.step();
        self.state = transition.state;
        tracing::info!(
            session_id = %self.id,
            from = from.as_str(),
            to = self.state.step().as_str(),
            "conversation transition"
        );

        for effect in transition.effects {
            self.enqueue(now, effect);
        }

        SubmitOutcome::Accepted { message_id }
    }

    /// Surface every effect that has come due by `now`, in order.
    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        for effect in self.pending.drain_due(now) {
            match effect {
                Effect::Say(reply) => {
                    let id = self.transcript.append(Sender::Assistant, reply, Utc::now());
                    outcome.appended.extend(self.transcript.get(id).cloned());
                }
                Effect::SettlePayment => {
                    let settled = conversation::settle_payment(
                        &self.state,
                        &self.branding,
                        self.ids.as_ref(),
                        Utc::now(),
                    );
                    let Some(settlement) = settled else {
                        tracing::warn!(
                            session_id = %self.id,
                            step = self.state.step().as_str(),
                            "payment settled outside processing_payment, discarded"
                        );
                        continue;
                    };

                    tracing::info!(
                        session_id = %self.id,
                        booking_id = %settlement.record.booking_id,
                        total = settlement.record.total_price,
                        "booking complete"
                    );
                    self.state = settlement.state;
                    let id = self
                        .transcript
                        .append(Sender::Assistant, settlement.reply, Utc::now());
                    outcome.appended.extend(self.transcript.get(id).cloned());
                    outcome.completed = Some(settlement.record);
                }
            }
        }

        outcome
    }

    /// Start a new booking in the same transcript.
    ///
    /// Replies still queued for the abandoned booking are dropped. Refused
    /// while a payment is being processed.
    pub fn restart(&mut self, now: Duration) -> bool {
        if self.state.step() == Step::ProcessingPayment {
            return false;
        }
        self.pending.retain(|effect| !matches!(effect, Effect::Say(_)));
        self.state = ConversationState::AwaitingExhibition;
        let greeting = conversation::greeting(&self.catalog, &self.branding);
        self.enqueue(now, Effect::Say(greeting));
        tracing::info!(session_id = %self.id, "conversation restarted");
        true
    }

    fn enqueue(&mut self, now: Duration, effect: Effect) {
        let delay = match effect {
            Effect::Say(_) => self.delays.typing,
            Effect::SettlePayment => self.delays.payment,
        };
        self.pending.schedule(now, delay, effect);
    }
}
