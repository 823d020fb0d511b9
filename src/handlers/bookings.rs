use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::errors::AppError;
use crate::models::BookingRecord;
use crate::services::ticket::{generate_ticket_json, ticket_filename};
use crate::state::AppState;

fn find_booking(state: &AppState, booking_id: &str) -> Result<BookingRecord, AppError> {
    state
        .bookings()?
        .get(booking_id)
        .cloned()
        .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Json<BookingRecord>, AppError> {
    Ok(Json(find_booking(&state, &booking_id)?))
}

// GET /api/bookings/:id/ticket
pub async fn download_ticket(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let booking_id = raw_id.strip_suffix(".json").unwrap_or(&raw_id);
    let booking = find_booking(&state, booking_id)?;

    let body = generate_ticket_json(&booking)?;
    let filename = ticket_filename(&booking);

    Ok((
        [
            (header::CONTENT_TYPE, "application/json; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}
