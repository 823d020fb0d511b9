use std::num::NonZeroU32;

use chrono::{DateTime, Utc};

use crate::models::{
    BookingRecord, BookingSummary, Branding, ConversationState, Exhibition, ExhibitionCatalog,
    Reply,
};
use crate::services::booking_id::BookingIdGenerator;

const DATE_SUGGESTIONS: [&str; 4] = ["Today", "Tomorrow", "This weekend", "Next week"];
const TICKET_SUGGESTIONS: [&str; 5] = ["1", "2", "3", "4", "5+"];
const CONFIRM_SUGGESTIONS: [&str; 2] = ["Yes, confirm", "No, start over"];
const AFFIRMATIVE_KEYWORDS: [&str; 3] = ["yes", "confirm", "proceed"];

/// Something the host must surface after its delay elapses.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append an assistant message after the typing delay.
    Say(Reply),
    /// After the payment delay, turn the draft into a booking record.
    SettlePayment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ConversationState,
    pub effects: Vec<Effect>,
}

/// Produced when a simulated payment settles.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub state: ConversationState,
    pub record: BookingRecord,
    pub reply: Reply,
}

/// Opening state and greeting for a new session.
///
/// A preselected exhibition that is not in the catalog is ignored.
pub fn start(
    catalog: &ExhibitionCatalog,
    branding: &Branding,
    preselected: Option<&str>,
) -> (ConversationState, Reply) {
    let selected = preselected
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .and_then(|name| {
            let found = catalog.find_match(name);
            if found.is_none() {
                tracing::warn!(exhibition = name, "preselected exhibition not in catalog");
            }
            found
        });

    match selected {
        Some(exhibition) => {
            let reply = Reply::text(format!(
                "I see you're interested in \"{}\". Let me help you book tickets for this exhibition! When would you like to visit?",
                exhibition.name
            ))
            .with_suggestions(DATE_SUGGESTIONS);
            (
                ConversationState::AwaitingDate {
                    exhibition: exhibition.clone(),
                },
                reply,
            )
        }
        None => (ConversationState::AwaitingExhibition, greeting(catalog, branding)),
    }
}

pub fn greeting(catalog: &ExhibitionCatalog, branding: &Branding) -> Reply {
    Reply::text(format!(
        "Hello! Welcome to {} 🎨 I'm your museum booking assistant. Which exhibition would you like to visit?",
        branding.venue_name
    ))
    .with_suggestions(catalog.names())
}

/// Advance the dialogue by one user input.
///
/// Returns `None` when the input is not accepted at all: blank input, or
/// any input while payment is processing or after completion.
pub fn transition(
    state: &ConversationState,
    input: &str,
    catalog: &ExhibitionCatalog,
) -> Option<Transition> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let transition = match state {
        ConversationState::AwaitingExhibition => match catalog.find_match(input) {
            Some(exhibition) => Transition {
                state: ConversationState::AwaitingDate {
                    exhibition: exhibition.clone(),
                },
                effects: vec![Effect::Say(date_prompt(exhibition))],
            },
            None => stay(
                state,
                Reply::text(
                    "Sorry, I couldn't find that exhibition. Please choose one of our current exhibitions:",
                )
                .with_suggestions(catalog.names()),
            ),
        },

        ConversationState::AwaitingDate { exhibition } => Transition {
            state: ConversationState::AwaitingTicketCount {
                exhibition: exhibition.clone(),
                visit_date: input.to_string(),
            },
            effects: vec![Effect::Say(
                Reply::text(format!("{input} it is! How many tickets would you like?"))
                    .with_suggestions(TICKET_SUGGESTIONS),
            )],
        },

        ConversationState::AwaitingTicketCount {
            exhibition,
            visit_date,
        } => match parse_ticket_count(input).and_then(|count| {
            BookingSummary::new(exhibition, visit_date, count).map(|summary| (count, summary))
        }) {
            Some((ticket_count, summary)) => Transition {
                state: ConversationState::AwaitingConfirmation {
                    exhibition: exhibition.clone(),
                    visit_date: visit_date.clone(),
                    ticket_count,
                },
                effects: vec![Effect::Say(summary_reply(summary))],
            },
            None => stay(
                state,
                Reply::text("Please enter a valid number of tickets (1 or more).")
                    .with_suggestions(TICKET_SUGGESTIONS),
            ),
        },

        ConversationState::AwaitingConfirmation {
            exhibition,
            visit_date,
            ticket_count,
        } => {
            if is_affirmative(input) {
                Transition {
                    state: ConversationState::ProcessingPayment {
                        exhibition: exhibition.clone(),
                        visit_date: visit_date.clone(),
                        ticket_count: *ticket_count,
                    },
                    effects: vec![
                        Effect::Say(Reply::text("🔒 Processing your payment... Please wait.")),
                        Effect::SettlePayment,
                    ],
                }
            } else {
                Transition {
                    state: ConversationState::AwaitingExhibition,
                    effects: vec![Effect::Say(
                        Reply::text(
                            "No problem, let's start over. Which exhibition would you like to visit?",
                        )
                        .with_suggestions(catalog.names()),
                    )],
                }
            }
        }

        ConversationState::ProcessingPayment { .. } | ConversationState::Complete { .. } => {
            return None;
        }
    };

    Some(transition)
}

/// Settle a pending payment into a booking record.
///
/// Returns `None` unless the state is `ProcessingPayment` with a
/// representable total.
pub fn settle_payment(
    state: &ConversationState,
    branding: &Branding,
    ids: &dyn BookingIdGenerator,
    now: DateTime<Utc>,
) -> Option<Settlement> {
    let ConversationState::ProcessingPayment {
        exhibition,
        visit_date,
        ticket_count,
    } = state
    else {
        return None;
    };

    let summary = BookingSummary::new(exhibition, visit_date, *ticket_count)?;
    let record = BookingRecord {
        booking_id: ids.next_id(&branding.booking_id_prefix),
        venue: branding.venue_name.clone(),
        exhibition: summary.exhibition,
        visit_date: summary.visit_date,
        ticket_count: summary.ticket_count,
        unit_price: summary.unit_price,
        total_price: summary.total,
        confirmed_at: now,
    };
    let reply = Reply::text(format!(
        "🎉 Payment successful! Your booking {} is confirmed. Have a wonderful visit!",
        record.booking_id
    ));

    Some(Settlement {
        state: ConversationState::Complete {
            record: record.clone(),
        },
        record,
        reply,
    })
}

/// First run of ASCII digits in the input, as a positive count.
///
/// A run preceded by a minus sign, zero, and values that overflow `u32`
/// are all rejected.
pub fn parse_ticket_count(input: &str) -> Option<NonZeroU32> {
    let start = input.find(|c: char| c.is_ascii_digit())?;
    if input[..start].ends_with('-') {
        return None;
    }
    let rest = &input[start..];
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    rest[..end].parse::<u32>().ok().and_then(NonZeroU32::new)
}

fn is_affirmative(input: &str) -> bool {
    let lowered = input.to_lowercase();
    AFFIRMATIVE_KEYWORDS.iter().any(|k| lowered.contains(k))
}

fn stay(state: &ConversationState, reply: Reply) -> Transition {
    Transition {
        state: state.clone(),
        effects: vec![Effect::Say(reply)],
    }
}

fn date_prompt(exhibition: &Exhibition) -> Reply {
    Reply::text(format!(
        "Great choice! {} runs about {} and costs ${} per ticket. When would you like to visit?",
        exhibition.name, exhibition.duration, exhibition.unit_price
    ))
    .with_suggestions(DATE_SUGGESTIONS)
}

fn summary_reply(summary: BookingSummary) -> Reply {
    Reply::text(format!(
        "📋 Booking Summary:\n• Exhibition: {}\n• Date: {}\n• Tickets: {}\n• Total: ${}\n\nShall I proceed with payment?",
        summary.exhibition, summary.visit_date, summary.ticket_count, summary.total
    ))
    .with_suggestions(CONFIRM_SUGGESTIONS)
    .with_summary(summary)
}
