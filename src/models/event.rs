use serde::Serialize;
use uuid::Uuid;

use super::{BookingRecord, Message};

/// Pushed to SSE subscribers as a session's transcript grows.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatEvent {
    Message {
        session_id: Uuid,
        message: Message,
    },
    BookingComplete {
        session_id: Uuid,
        booking: BookingRecord,
    },
}

impl ChatEvent {
    pub fn session_id(&self) -> Uuid {
        match self {
            ChatEvent::Message { session_id, .. } | ChatEvent::BookingComplete { session_id, .. } => {
                *session_id
            }
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            ChatEvent::Message { .. } => "message",
            ChatEvent::BookingComplete { .. } => "booking_complete",
        }
    }
}
