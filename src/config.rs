use std::env;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

use crate::models::{Branding, ClockFormat};
use crate::services::session::Delays;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub branding: Branding,
    pub typing_delay_ms: u64,
    pub payment_delay_ms: u64,
    pub display_utc_offset_minutes: i32,
    pub clock_format: ClockFormat,
    pub cors_allow_any: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let branding = match env::var("BRAND") {
            Ok(name) => Branding::parse(&name).unwrap_or_else(|| {
                tracing::warn!(brand = %name, "unknown BRAND, using talk2book");
                Branding::default()
            }),
            Err(_) => Branding::default(),
        };

        Self {
            port: parse_var("PORT").unwrap_or(3000),
            branding,
            typing_delay_ms: parse_var("TYPING_DELAY_MS").unwrap_or(1000),
            payment_delay_ms: parse_var("PAYMENT_DELAY_MS").unwrap_or(2000),
            display_utc_offset_minutes: parse_var("DISPLAY_UTC_OFFSET_MINUTES").unwrap_or(0),
            clock_format: env::var("CLOCK_FORMAT")
                .map(|v| ClockFormat::parse(&v))
                .unwrap_or_default(),
            cors_allow_any: parse_var("CORS_ALLOW_ANY").unwrap_or(true),
        }
    }

    pub fn delays(&self) -> Delays {
        Delays {
            typing: Duration::from_millis(self.typing_delay_ms),
            payment: Duration::from_millis(self.payment_delay_ms),
        }
    }

    /// Offset used for message timestamps; out-of-range values fall back to UTC.
    pub fn display_offset(&self) -> FixedOffset {
        self.display_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
