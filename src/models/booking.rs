use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Exhibition;

/// Booking fields collected so far. Unset fields are `None`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BookingDraft {
    pub exhibition: Option<Exhibition>,
    pub visit_date: Option<String>,
    pub ticket_count: Option<NonZeroU32>,
}

impl BookingDraft {
    pub fn is_empty(&self) -> bool {
        self.exhibition.is_none() && self.visit_date.is_none() && self.ticket_count.is_none()
    }

    /// Unit price times ticket count, once both are known.
    pub fn total(&self) -> Option<u32> {
        let exhibition = self.exhibition.as_ref()?;
        total_price(exhibition, self.ticket_count?)
    }
}

/// Unit price times ticket count; `None` when the product overflows `u32`.
pub fn total_price(exhibition: &Exhibition, ticket_count: NonZeroU32) -> Option<u32> {
    exhibition.unit_price.checked_mul(ticket_count.get())
}

/// Snapshot attached to the confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingSummary {
    pub exhibition: String,
    pub visit_date: String,
    pub ticket_count: u32,
    pub unit_price: u32,
    pub total: u32,
}

impl BookingSummary {
    /// `None` when the total cannot be represented.
    pub fn new(exhibition: &Exhibition, visit_date: &str, ticket_count: NonZeroU32) -> Option<Self> {
        Some(Self {
            exhibition: exhibition.name.clone(),
            visit_date: visit_date.to_string(),
            ticket_count: ticket_count.get(),
            unit_price: exhibition.unit_price,
            total: total_price(exhibition, ticket_count)?,
        })
    }
}

/// Immutable result of a completed (simulated) payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRecord {
    pub booking_id: String,
    pub venue: String,
    pub exhibition: String,
    pub visit_date: String,
    pub ticket_count: u32,
    pub unit_price: u32,
    pub total_price: u32,
    pub confirmed_at: DateTime<Utc>,
}

/// Shape of the downloadable ticket file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TicketFile {
    pub booking_id: String,
    pub museum: String,
    pub exhibition: String,
    pub date: String,
    pub tickets: u32,
    pub total: u32,
}
