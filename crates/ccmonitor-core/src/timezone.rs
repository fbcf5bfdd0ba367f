//! Timezone utilities for wall-clock scheduling
//!
//! Reset hours are local wall-clock hours, so every schedule computation
//! goes through a [`TimezoneConfig`]. This module detects the system zone
//! and parses zone names supplied on the command line.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Configuration for timezone handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneConfig {
    /// The timezone reset hours and displayed times are expressed in
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        let tz = get_local_timezone();
        Self {
            is_utc: tz == Tz::UTC,
            tz,
        }
    }
}

impl TimezoneConfig {
    /// Fixed zone, bypassing detection
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            is_utc: tz == Tz::UTC,
        }
    }

    /// Create a new timezone configuration from CLI arguments
    pub fn from_cli(timezone_str: Option<&str>, use_utc: bool) -> crate::error::Result<Self> {
        if use_utc {
            return Ok(Self::new(Tz::UTC));
        }

        if let Some(tz_str) = timezone_str {
            let tz = Tz::from_str(tz_str).map_err(|_| {
                crate::error::CcmonitorError::InvalidTimezone(format!(
                    "'{}'. Use format like 'America/New_York', 'Europe/Warsaw', or 'UTC'",
                    tz_str
                ))
            })?;
            Ok(Self::new(tz))
        } else {
            Ok(Self::default())
        }
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// Convert a UTC instant to wall-clock time in this zone
    pub fn localize(&self, dt: DateTime<Utc>) -> DateTime<Tz> {
        dt.with_timezone(&self.tz)
    }
}

/// Detect the system's local timezone
///
/// Checks `TZ` first, then asks the platform through `iana-time-zone`.
/// Falls back to UTC when neither yields a known zone.
pub fn get_local_timezone() -> Tz {
    if let Ok(tz_str) = std::env::var("TZ")
        && let Ok(tz) = Tz::from_str(&tz_str)
    {
        debug!("Using timezone from TZ environment variable: {}", tz_str);
        return tz;
    }

    match iana_time_zone::get_timezone() {
        Ok(tz_str) => match Tz::from_str(&tz_str) {
            Ok(tz) => {
                debug!("Using system timezone from iana-time-zone: {}", tz_str);
                tz
            }
            Err(_) => {
                debug!(
                    "Could not parse timezone from iana-time-zone: '{}', falling back to UTC",
                    tz_str
                );
                Tz::UTC
            }
        },
        Err(e) => {
            debug!(
                "Could not detect local timezone via iana-time-zone: {:?}, falling back to UTC",
                e
            );
            Tz::UTC
        }
    }
}
