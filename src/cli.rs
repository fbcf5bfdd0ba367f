//! CLI interface for ccmonitor
//!
//! All settings are collected once at startup and validated into a
//! [`MonitorConfig`] plus the data source selection.
//!
//! # Example
//!
//! ```bash
//! # Monitor a Max5 subscription, resets at 15:00 local time
//! ccmonitor --plan max5 --reset-hour 15
//!
//! # Derive the budget from the largest past session, emit JSON lines
//! ccmonitor --plan custom_max --json
//!
//! # Replay a saved `ccusage blocks --json` snapshot once
//! ccmonitor --input blocks.json --once
//! ```

use ccmonitor_core::error::{CcmonitorError, Result};
use ccmonitor_core::monitor::MonitorConfig;
use ccmonitor_core::reset::ResetSchedule;
use ccmonitor_core::timezone::TimezoneConfig;
use ccmonitor_core::types::Plan;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Default usage tool invoked for snapshots
pub const DEFAULT_USAGE_COMMAND: &str = "ccusage";

/// Live monitor for Claude Code token usage
#[derive(Parser, Debug, Clone)]
#[command(name = "ccmonitor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subscription plan that sets the token budget
    #[arg(long, default_value = "pro", value_parser = parse_plan, env = "CCMONITOR_PLAN")]
    pub plan: Plan,

    /// Custom daily reset hour (0-23), replacing the default schedule
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23))]
    pub reset_hour: Option<u32>,

    /// Timezone for reset hours and displayed times (e.g. "Europe/Warsaw")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z')]
    pub timezone: Option<String>,

    /// Use UTC for reset hours (overrides --timezone)
    #[arg(long)]
    pub utc: bool,

    /// Refresh interval in seconds
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Usage tool to run as `<command> blocks --json`
    #[arg(long, default_value = DEFAULT_USAGE_COMMAND, env = "CCMONITOR_CCUSAGE")]
    pub command: String,

    /// Read snapshots from a JSON file instead of running the usage tool
    #[arg(long, conflicts_with = "command")]
    pub input: Option<PathBuf>,

    /// Emit one JSON object per tick instead of the dashboard
    #[arg(long)]
    pub json: bool,

    /// Run a single tick and exit
    #[arg(long)]
    pub once: bool,

    /// Show informational logs on stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// Validate the arguments into a monitor configuration
    pub fn monitor_config(&self) -> Result<MonitorConfig> {
        let timezone = TimezoneConfig::from_cli(self.timezone.as_deref(), self.utc)?;
        let reset_schedule = ResetSchedule::from_custom_hour(self.reset_hour)?;
        if self.interval == 0 {
            return Err(CcmonitorError::InvalidArgument(
                "interval must be at least 1 second".to_string(),
            ));
        }
        Ok(MonitorConfig::new(self.plan, reset_schedule, timezone)
            .with_refresh_interval(Duration::from_secs(self.interval)))
    }
}

/// Parse a plan name for clap
///
/// # Examples
/// ```
/// use ccmonitor::cli::parse_plan;
/// use ccmonitor_core::types::Plan;
///
/// assert_eq!(parse_plan("max20").unwrap(), Plan::Max20);
/// assert!(parse_plan("gold").is_err());
/// ```
pub fn parse_plan(s: &str) -> std::result::Result<Plan, String> {
    s.parse()
}
