use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{format_time, BookingRecord, ChatEvent, Message, Step};
use crate::services::pump::{drain_session, spawn_pump};
use crate::services::session::{ChatSession, IgnoredReason, SubmitOutcome};
use crate::state::{AppState, SessionEntry};

#[derive(Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    /// Hour:minute label in the configured display offset.
    pub time: String,
}

#[derive(Serialize)]
pub struct DraftView {
    pub exhibition: Option<String>,
    pub visit_date: Option<String>,
    pub ticket_count: Option<u32>,
    pub total: Option<u32>,
}

#[derive(Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub assistant_name: String,
    pub step: Step,
    pub typing: bool,
    pub draft: DraftView,
    pub messages: Vec<MessageView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingRecord>,
}

fn session_view(state: &AppState, session: &ChatSession) -> SessionView {
    let offset = state.config.display_offset();
    let clock = state.config.clock_format;
    let draft = session.draft();

    SessionView {
        id: session.id(),
        assistant_name: session.branding().assistant_name.clone(),
        step: session.step(),
        typing: session.is_typing(),
        draft: DraftView {
            exhibition: draft.exhibition.as_ref().map(|e| e.name.clone()),
            visit_date: draft.visit_date.clone(),
            ticket_count: draft.ticket_count.map(|n| n.get()),
            total: draft.total(),
        },
        messages: session
            .transcript()
            .iter()
            .map(|m| MessageView {
                message: m.clone(),
                time: format_time(&m.created_at, offset, clock),
            })
            .collect(),
        booking: session.booking().cloned(),
    }
}

fn load_view(state: &AppState, id: Uuid) -> Result<SessionView, AppError> {
    let sessions = state.sessions()?;
    let entry = sessions.get(&id).ok_or(AppError::SessionNotFound(id))?;
    Ok(session_view(state, &entry.session))
}

// POST /api/chat/sessions
#[derive(Deserialize, Default)]
pub struct CreateSessionRequest {
    pub exhibition: Option<String>,
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let session = ChatSession::new(
        Arc::clone(&state.catalog),
        state.config.branding.clone(),
        Arc::clone(&state.ids),
        state.config.delays(),
        body.exhibition.as_deref(),
    );
    let id = session.id();
    let view = session_view(&state, &session);

    state.sessions()?.insert(id, SessionEntry::new(session));

    Ok((StatusCode::CREATED, Json(view)))
}

// GET /api/chat/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    drain_session(&state, id)?;
    Ok(Json(load_view(&state, id)?))
}

// POST /api/chat/sessions/:id/messages
#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct SendMessageResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<IgnoredReason>,
    pub session: SessionView,
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, AppError> {
    // surface replies that came due before this input
    drain_session(&state, id)?;

    let outcome = {
        let mut sessions = state.sessions()?;
        let entry = sessions.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;
        let now = entry.elapsed();
        let outcome = entry.session.submit(&payload.text, now);
        if let SubmitOutcome::Accepted { message_id } = &outcome {
            // published under the lock so it cannot overtake a racing drain
            if let Some(message) = entry.session.transcript().get(*message_id) {
                state.publish(ChatEvent::Message {
                    session_id: id,
                    message: message.clone(),
                });
            }
        }
        outcome
    };

    let reason = match outcome {
        SubmitOutcome::Accepted { .. } => {
            drain_session(&state, id)?;
            spawn_pump(Arc::clone(&state), id);
            None
        }
        SubmitOutcome::Ignored(reason) => Some(reason),
    };

    Ok(Json(SendMessageResponse {
        accepted: reason.is_none(),
        reason,
        session: load_view(&state, id)?,
    }))
}

// POST /api/chat/sessions/:id/restart
pub async fn restart_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    drain_session(&state, id)?;

    let restarted = {
        let mut sessions = state.sessions()?;
        let entry = sessions.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;
        let now = entry.elapsed();
        entry.session.restart(now)
    };
    if !restarted {
        return Err(AppError::Conflict(
            "cannot restart while a payment is processing".to_string(),
        ));
    }

    drain_session(&state, id)?;
    spawn_pump(Arc::clone(&state), id);
    Ok(Json(load_view(&state, id)?))
}

// DELETE /api/chat/sessions/:id
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut sessions = state.sessions()?;
    let entry = sessions.get(&id).ok_or(AppError::SessionNotFound(id))?;
    if entry.session.step() == Step::ProcessingPayment {
        return Err(AppError::Conflict(
            "cannot end a session while a payment is processing".to_string(),
        ));
    }
    sessions.remove(&id);
    tracing::info!(session_id = %id, "chat session ended");
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/chat/sessions/:id/events (SSE)
#[derive(Deserialize)]
pub struct EventsQuery {
    pub last_id: Option<u64>,
}

pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    drain_session(&state, id)?;

    // subscribe before snapshotting so nothing falls between the two
    let rx = state.events_tx.subscribe();
    let catchup: Vec<ChatEvent> = {
        let sessions = state.sessions()?;
        let entry = sessions.get(&id).ok_or(AppError::SessionNotFound(id))?;
        let session = &entry.session;
        let messages = session
            .transcript()
            .since(query.last_id.unwrap_or(0))
            .iter()
            .cloned()
            .map(|message| ChatEvent::Message {
                session_id: id,
                message,
            });
        let booking = session.booking().cloned().map(|booking| ChatEvent::BookingComplete {
            session_id: id,
            booking,
        });
        messages.chain(booking).collect()
    };
    let last_seen = catchup
        .iter()
        .filter_map(|e| match e {
            ChatEvent::Message { message, .. } => Some(message.id),
            ChatEvent::BookingComplete { .. } => None,
        })
        .max()
        .unwrap_or(query.last_id.unwrap_or(0));
    let booking_sent = catchup
        .iter()
        .any(|e| matches!(e, ChatEvent::BookingComplete { .. }));

    let catchup_stream = tokio_stream::iter(
        catchup
            .into_iter()
            .map(|event| Ok::<_, Infallible>(to_sse(&event))),
    );

    let live_stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if event.session_id() == id => match &event {
            // already delivered by the catch-up
            ChatEvent::Message { message, .. } if message.id <= last_seen => None,
            ChatEvent::BookingComplete { .. } if booking_sent => None,
            _ => Some(Ok::<_, Infallible>(to_sse(&event))),
        },
        Ok(_) => None,
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => None,
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(30))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    let combined = catchup_stream.chain(live_stream);
    let merged = StreamExt::merge(combined, keepalive_stream);

    Ok(Sse::new(merged))
}

fn to_sse(event: &ChatEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_default();
    Event::default().data(data).event(event.event_name())
}
