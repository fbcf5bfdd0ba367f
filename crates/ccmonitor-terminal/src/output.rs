//! Per-tick output formatting
//!
//! The live monitor hands every tick to a [`ReportFormatter`]: the
//! dashboard for interactive terminals, or JSON lines for piping into
//! other tools.
//!
//! # Examples
//!
//! ```no_run
//! use ccmonitor_terminal::output::get_formatter;
//!
//! let formatter = get_formatter(true, chrono_tz::Tz::UTC, 3);
//! assert!(!formatter.clears_screen());
//! ```

use crate::dashboard::Dashboard;
use ccmonitor_core::monitor::{MonitorReport, SkipReason};
use chrono::{DateTime, Utc};
use serde_json::json;

/// Trait for tick output formatters
pub trait ReportFormatter {
    /// Format a rendered tick
    fn format_report(&self, report: &MonitorReport) -> String;

    /// Format a skipped tick
    fn format_skip(&self, reason: &SkipReason, now: DateTime<Utc>) -> String;

    /// Whether the driver should clear the screen before each frame
    fn clears_screen(&self) -> bool;
}

impl ReportFormatter for Dashboard {
    fn format_report(&self, report: &MonitorReport) -> String {
        self.render_report(report)
    }

    fn format_skip(&self, reason: &SkipReason, now: DateTime<Utc>) -> String {
        self.render_notice(reason, now)
    }

    fn clears_screen(&self) -> bool {
        true
    }
}

/// One JSON object per line
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format_report(&self, report: &MonitorReport) -> String {
        serde_json::to_string(report).unwrap_or_else(|e| {
            tracing::warn!("Failed to serialize report: {}", e);
            json!({ "error": e.to_string() }).to_string()
        })
    }

    fn format_skip(&self, reason: &SkipReason, now: DateTime<Utc>) -> String {
        let detail = match reason {
            SkipReason::FetchFailed(error) => Some(error.as_str()),
            SkipReason::NoActiveSession => None,
        };
        json!({
            "generatedAt": now.to_rfc3339(),
            "skipped": reason.to_string(),
            "error": detail,
        })
        .to_string()
    }

    fn clears_screen(&self) -> bool {
        false
    }
}

/// Pick the formatter for the requested output mode
pub fn get_formatter(
    json: bool,
    timezone: chrono_tz::Tz,
    refresh_secs: u64,
) -> Box<dyn ReportFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(Dashboard::new(timezone, refresh_secs))
    }
}
