//! Shared test utilities for unit tests
//!
//! Integration tests in the root crate keep their own builders in
//! tests/common/mod.rs since this module only exists under `cfg(test)`.

use crate::types::UsageBlock;
use chrono::{DateTime, Duration, TimeZone, Utc};
use once_cell::sync::Lazy;
use std::env;

// Serializes environment variable modifications across tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// Fixed reference instant used by most unit tests
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
}

/// Closed block spanning `[now - start_ago, now - end_ago]`
pub fn closed_block(now: DateTime<Utc>, start_ago: i64, end_ago: i64, tokens: u64) -> UsageBlock {
    UsageBlock {
        start_time: Some(now - Duration::minutes(start_ago)),
        actual_end_time: Some(now - Duration::minutes(end_ago)),
        total_tokens: tokens,
        ..UsageBlock::default()
    }
}

/// Active block started `start_ago` minutes before `now`
pub fn active_block(now: DateTime<Utc>, start_ago: i64, tokens: u64) -> UsageBlock {
    UsageBlock {
        start_time: Some(now - Duration::minutes(start_ago)),
        total_tokens: tokens,
        is_active: true,
        ..UsageBlock::default()
    }
}

/// Gap placeholder covering `[now - start_ago, now - end_ago]`
pub fn gap_block(now: DateTime<Utc>, start_ago: i64, end_ago: i64) -> UsageBlock {
    UsageBlock {
        is_gap: true,
        ..closed_block(now, start_ago, end_ago, 0)
    }
}

/// RAII guard for environment variable manipulation in tests
pub struct EnvVarGuard {
    vars: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set an environment variable and remember its original value
    pub fn set(&mut self, key: &str, value: &str) {
        let original = env::var(key).ok();
        self.vars.push((key.to_string(), original));
        // env::set_var is unsafe since Rust 1.82
        unsafe {
            env::set_var(key, value);
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.vars.iter().rev() {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

impl Default for EnvVarGuard {
    fn default() -> Self {
        Self::new()
    }
}
