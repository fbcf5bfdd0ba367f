//! ccmonitor - Live terminal monitor for Claude Code token usage
//!
//! This library provides:
//! - Data sources that poll the `ccusage` tool or read saved snapshots
//! - The polling driver that feeds each snapshot through the core metrics
//! - The command-line interface
//!
//! The metrics themselves (burn rate, plan limits, reset schedule and
//! depletion prediction) live in `ccmonitor-core`; rendering lives in
//! `ccmonitor-terminal`.
//!
//! # Examples
//!
//! ```no_run
//! use ccmonitor::{
//!     data_source::CcusageCommand,
//!     live_monitor::LiveMonitor,
//! };
//! use ccmonitor_core::monitor::{MonitorConfig, MonitorState};
//! use ccmonitor_core::reset::ResetSchedule;
//! use ccmonitor_core::timezone::TimezoneConfig;
//! use ccmonitor_core::types::Plan;
//! use ccmonitor_terminal::output::get_formatter;
//!
//! #[tokio::main]
//! async fn main() -> ccmonitor::Result<()> {
//!     let config = MonitorConfig::new(Plan::Max5, ResetSchedule::Default, TimezoneConfig::default());
//!     let formatter = get_formatter(false, config.timezone.tz, 3);
//!     let monitor = LiveMonitor::new(
//!         CcusageCommand::new("ccusage"),
//!         MonitorState::new(config),
//!         formatter,
//!     );
//!     monitor.run().await
//! }
//! ```

pub mod cli;
pub mod data_source;
pub mod live_monitor;

pub use ccmonitor_core::error;
pub use ccmonitor_core::timezone;
pub use ccmonitor_core::types;

// Re-export commonly used types
pub use error::{CcmonitorError, Result};
pub use types::{Plan, Snapshot, UsageBlock};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
