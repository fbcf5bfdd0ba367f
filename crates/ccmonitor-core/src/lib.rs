//! Core types, metrics and prediction logic for ccmonitor
//!
//! This crate holds everything the live monitor derives from a usage
//! snapshot: the hourly burn rate, the plan token limit, the next reset
//! and the predicted depletion time, plus the loop state that ties them
//! together on every tick.

pub mod burn_rate;
pub mod error;
pub mod limits;
pub mod monitor;
pub mod prediction;
pub mod provider;
pub mod reset;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{CcmonitorError, Result};
pub use monitor::{MonitorConfig, MonitorReport, MonitorState, SkipReason, TickOutcome};
pub use types::{Plan, Snapshot, UsageBlock, VelocityCategory};
