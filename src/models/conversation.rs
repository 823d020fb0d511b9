use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::{BookingDraft, BookingRecord, Exhibition};

/// Flat step tag for logging and API views.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AwaitingExhibition,
    AwaitingDate,
    AwaitingTicketCount,
    AwaitingConfirmation,
    ProcessingPayment,
    Complete,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::AwaitingExhibition => "awaiting_exhibition",
            Step::AwaitingDate => "awaiting_date",
            Step::AwaitingTicketCount => "awaiting_ticket_count",
            Step::AwaitingConfirmation => "awaiting_confirmation",
            Step::ProcessingPayment => "processing_payment",
            Step::Complete => "complete",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Complete)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the booking dialogue is, with exactly the fields collected so far.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConversationState {
    #[default]
    AwaitingExhibition,
    AwaitingDate {
        exhibition: Exhibition,
    },
    AwaitingTicketCount {
        exhibition: Exhibition,
        visit_date: String,
    },
    AwaitingConfirmation {
        exhibition: Exhibition,
        visit_date: String,
        ticket_count: NonZeroU32,
    },
    ProcessingPayment {
        exhibition: Exhibition,
        visit_date: String,
        ticket_count: NonZeroU32,
    },
    Complete {
        record: BookingRecord,
    },
}

impl ConversationState {
    pub fn step(&self) -> Step {
        match self {
            ConversationState::AwaitingExhibition => Step::AwaitingExhibition,
            ConversationState::AwaitingDate { .. } => Step::AwaitingDate,
            ConversationState::AwaitingTicketCount { .. } => Step::AwaitingTicketCount,
            ConversationState::AwaitingConfirmation { .. } => Step::AwaitingConfirmation,
            ConversationState::ProcessingPayment { .. } => Step::ProcessingPayment,
            ConversationState::Complete { .. } => Step::Complete,
        }
    }

    /// The in-progress booking. Empty once confirmed into a record.
    pub fn draft(&self) -> BookingDraft {
        match self {
            ConversationState::AwaitingExhibition | ConversationState::Complete { .. } => {
                BookingDraft::default()
            }
            ConversationState::AwaitingDate { exhibition } => BookingDraft {
                exhibition: Some(exhibition.clone()),
                ..Default::default()
            },
            ConversationState::AwaitingTicketCount {
                exhibition,
                visit_date,
            } => BookingDraft {
                exhibition: Some(exhibition.clone()),
                visit_date: Some(visit_date.clone()),
                ticket_count: None,
            },
            ConversationState::AwaitingConfirmation {
                exhibition,
                visit_date,
                ticket_count,
            }
            | ConversationState::ProcessingPayment {
                exhibition,
                visit_date,
                ticket_count,
            } => BookingDraft {
                exhibition: Some(exhibition.clone()),
                visit_date: Some(visit_date.clone()),
                ticket_count: Some(*ticket_count),
            },
        }
    }

    pub fn record(&self) -> Option<&BookingRecord> {
        match self {
            ConversationState::Complete { record } => Some(record),
            _ => None,
        }
    }
}
