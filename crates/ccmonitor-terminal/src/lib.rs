//! Terminal output for ccmonitor
//!
//! This crate provides the live dashboard and the JSON line formatter
//! used by the monitor for each tick.

pub mod dashboard;
pub mod output;

pub use dashboard::Dashboard;
pub use output::{JsonFormatter, ReportFormatter, get_formatter};
