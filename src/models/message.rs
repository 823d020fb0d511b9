use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::BookingSummary;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_replies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<BookingSummary>,
}

/// Assistant output before it is stamped into the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub suggested_replies: Vec<String>,
    pub summary: Option<BookingSummary>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            suggested_replies: Vec::new(),
            summary: None,
        }
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggested_replies = suggestions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_summary(mut self, summary: BookingSummary) -> Self {
        self.summary = Some(summary);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClockFormat {
    #[default]
    TwelveHour,
    TwentyFourHour,
}

impl ClockFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "24h" | "24" | "twenty_four_hour" => ClockFormat::TwentyFourHour,
            _ => ClockFormat::TwelveHour,
        }
    }
}

/// Hour:minute label for a message bubble.
pub fn format_time(at: &DateTime<Utc>, offset: FixedOffset, clock: ClockFormat) -> String {
    let local = at.with_timezone(&offset);
    match clock {
        ClockFormat::TwelveHour => local.format("%I:%M %p").to_string(),
        ClockFormat::TwentyFourHour => local.format("%H:%M").to_string(),
    }
}
