pub mod bookings;
pub mod chat;
pub mod exhibitions;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/exhibitions", get(exhibitions::list_exhibitions))
        .route("/api/exhibitions/:id", get(exhibitions::get_exhibition))
        .route("/api/chat/sessions", post(chat::create_session))
        .route(
            "/api/chat/sessions/:id",
            get(chat::get_session).delete(chat::delete_session),
        )
        .route("/api/chat/sessions/:id/messages", post(chat::send_message))
        .route("/api/chat/sessions/:id/restart", post(chat::restart_session))
        .route("/api/chat/sessions/:id/events", get(chat::events_stream))
        .route("/api/bookings/:id", get(bookings::get_booking))
        .route("/api/bookings/:id/ticket", get(bookings::download_ticket))
        .with_state(state)
}
