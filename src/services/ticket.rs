use crate::models::{BookingRecord, TicketFile};

pub fn ticket_file(booking: &BookingRecord) -> TicketFile {
    TicketFile {
        booking_id: booking.booking_id.clone(),
        museum: booking.venue.clone(),
        exhibition: booking.exhibition.clone(),
        date: booking.visit_date.clone(),
        tickets: booking.ticket_count,
        total: booking.total_price,
    }
}

pub fn ticket_filename(booking: &BookingRecord) -> String {
    format!("ticket-{}.json", booking.booking_id)
}

/// Pretty-printed JSON body for the "download ticket" button.
pub fn generate_ticket_json(booking: &BookingRecord) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ticket_file(booking))
}
