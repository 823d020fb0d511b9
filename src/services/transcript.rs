use chrono::{DateTime, Utc};

use crate::models::{Message, Reply, Sender};

/// Insert-only ordered log of a chat session.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its ordinal. Ordinals start at 1.
    pub fn append(&mut self, sender: Sender, reply: Reply, created_at: DateTime<Utc>) -> u64 {
        let id = self.messages.len() as u64 + 1;
        self.messages.push(Message {
            id,
            text: reply.text,
            sender,
            created_at,
            suggested_replies: reply.suggested_replies,
            summary: reply.summary,
        });
        id
    }

    pub fn append_user(&mut self, text: &str, created_at: DateTime<Utc>) -> u64 {
        self.append(Sender::User, Reply::text(text), created_at)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages with an id greater than `last_id`.
    pub fn since(&self, last_id: u64) -> &[Message] {
        let start = usize::try_from(last_id).unwrap_or(usize::MAX).min(self.messages.len());
        &self.messages[start..]
    }

    pub fn get(&self, id: u64) -> Option<&Message> {
        let idx = usize::try_from(id).ok()?.checked_sub(1)?;
        self.messages.get(idx)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
