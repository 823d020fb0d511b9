use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ChatEvent;
use crate::state::AppState;

/// Apply whatever a session has due right now.
///
/// Completed bookings are handed to the booking store and every appended
/// message is broadcast. Events are published while the sessions lock is
/// held, so subscribers see one session's events in transcript order even
/// when several drains race. Returns how long until the next pending effect.
pub fn drain_session(state: &AppState, session_id: Uuid) -> Result<Option<Duration>, AppError> {
    let mut sessions = state.sessions()?;
    let entry = sessions
        .get_mut(&session_id)
        .ok_or(AppError::SessionNotFound(session_id))?;
    let now = entry.elapsed();
    let outcome = entry.session.tick(now);
    let wait = entry.session.next_due().map(|due| due.saturating_sub(now));

    for message in outcome.appended {
        state.publish(ChatEvent::Message {
            session_id,
            message,
        });
    }

    if let Some(booking) = outcome.completed {
        state
            .bookings()?
            .insert(booking.booking_id.clone(), booking.clone());
        state.publish(ChatEvent::BookingComplete {
            session_id,
            booking,
        });
    }

    Ok(wait)
}

/// Drain a session on wall-clock time until its queue is empty.
///
/// Several pumps for one session are harmless: each effect is drained once.
/// A pump whose session was deleted stops quietly.
pub fn spawn_pump(state: Arc<AppState>, session_id: Uuid) {
    tokio::spawn(async move {
        loop {
            match drain_session(&state, session_id) {
                Ok(Some(wait)) => tokio::time::sleep(wait).await,
                Ok(None) => break,
                Err(AppError::SessionNotFound(_)) => {
                    tracing::debug!(session_id = %session_id, "session gone, pump stopped");
                    break;
                }
                Err(e) => {
                    tracing::error!(session_id = %session_id, error = %e, "session pump stopped");
                    break;
                }
            }
        }
    });
}
