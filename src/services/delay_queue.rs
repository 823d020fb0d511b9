use std::collections::VecDeque;
use std::time::Duration;

struct Scheduled<T> {
    due: Duration,
    item: T,
}

/// FIFO of delayed effects on virtual time.
///
/// Time is a `Duration` measured from an arbitrary origin (session start).
/// Each item becomes due `delay` after the later of `now` and the previous
/// item's due time, so a chain of items surfaces one after another in the
/// order it was scheduled.
pub struct DelayQueue<T> {
    items: VecDeque<Scheduled<T>>,
}

impl<T> DelayQueue<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Returns the due time assigned to the item.
    pub fn schedule(&mut self, now: Duration, delay: Duration, item: T) -> Duration {
        let base = match self.items.back() {
            Some(last) if last.due > now => last.due,
            _ => now,
        };
        let due = base.saturating_add(delay);
        self.items.push_back(Scheduled { due, item });
        due
    }

    /// Pop every item whose due time has been reached, in scheduling order.
    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        let mut ready = Vec::new();
        while self.items.front().is_some_and(|s| s.due <= now) {
            if let Some(s) = self.items.pop_front() {
                ready.push(s.item);
            }
        }
        ready
    }

    /// Keep only the items matching `keep`. Survivors keep their due times.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.items.retain(|s| keep(&s.item));
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.items.front().map(|s| s.due)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for DelayQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
