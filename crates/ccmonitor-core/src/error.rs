//! Error types for ccmonitor
//!
//! This module defines the error types used throughout the ccmonitor crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use ccmonitor_core::error::{CcmonitorError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to CcmonitorError
//!     let _file = std::fs::read_to_string("nonexistent.json")?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;
use thiserror::Error;

/// Main error type for ccmonitor operations
///
/// Fetch-side variants (`Io`, `Json`, `InvalidSnapshot`, `CommandFailed`,
/// `Timeout`) are transient for the polling loop. Everything else is fatal
/// wherever it surfaces.
#[derive(Error, Debug)]
pub enum CcmonitorError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot was well-formed JSON but not a usable snapshot
    #[error("Invalid usage snapshot: {0}")]
    InvalidSnapshot(String),

    /// The external usage command exited unsuccessfully
    #[error("Command '{command}' failed ({status}): {stderr}")]
    CommandFailed {
        /// Command line that was run
        command: String,
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// The external usage command did not finish in time
    #[error("Usage command timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Reset hour outside 0..=23
    #[error("Invalid reset hour: {0} (expected 0-23)")]
    InvalidResetHour(u32),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CcmonitorError {
    /// Whether the polling loop should skip the tick and retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CcmonitorError::Io(_)
                | CcmonitorError::Json(_)
                | CcmonitorError::InvalidSnapshot(_)
                | CcmonitorError::CommandFailed { .. }
                | CcmonitorError::Timeout(_)
        )
    }
}

/// Convenience type alias for Results in ccmonitor
pub type Result<T> = std::result::Result<T, CcmonitorError>;
