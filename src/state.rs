use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{BookingRecord, ChatEvent, ExhibitionCatalog};
use crate::services::booking_id::BookingIdGenerator;
use crate::services::session::ChatSession;

/// A live session plus the wall-clock origin its virtual time counts from.
pub struct SessionEntry {
    pub session: ChatSession,
    pub started: Instant,
}

impl SessionEntry {
    pub fn new(session: ChatSession) -> Self {
        Self {
            session,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub catalog: Arc<ExhibitionCatalog>,
    pub ids: Arc<dyn BookingIdGenerator>,
    pub sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    pub bookings: Mutex<HashMap<String, BookingRecord>>,
    pub events_tx: broadcast::Sender<ChatEvent>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        catalog: ExhibitionCatalog,
        ids: Arc<dyn BookingIdGenerator>,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(256);
        Self {
            config,
            catalog: Arc::new(catalog),
            ids,
            sessions: Mutex::new(HashMap::new()),
            bookings: Mutex::new(HashMap::new()),
            events_tx,
        }
    }

    pub fn sessions(&self) -> Result<MutexGuard<'_, HashMap<Uuid, SessionEntry>>, AppError> {
        self.sessions.lock().map_err(|_| AppError::LockPoisoned)
    }

    pub fn bookings(&self) -> Result<MutexGuard<'_, HashMap<String, BookingRecord>>, AppError> {
        self.bookings.lock().map_err(|_| AppError::LockPoisoned)
    }

    /// Broadcast to SSE subscribers; ignored when nobody listens.
    pub fn publish(&self, event: ChatEvent) {
        let _ = self.events_tx.send(event);
    }
}
