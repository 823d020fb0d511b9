use std::sync::atomic::{AtomicU64, Ordering};

/// Source of booking references. Injected so tests get stable ids.
pub trait BookingIdGenerator: Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}

/// `PREFIX-` followed by eight uppercase hex characters of a v4 UUID.
pub struct RandomIdGenerator;

impl BookingIdGenerator for RandomIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        let raw = uuid::Uuid::new_v4().simple().to_string();
        format!("{prefix}-{}", raw[..8].to_uppercase())
    }
}

/// `PREFIX-000001`, `PREFIX-000002`, ...
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            counter: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingIdGenerator for SequentialIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}-{n:06}")
    }
}
