//! Hourly burn rate over the trailing 60 minutes
//!
//! Each block's tokens are assumed to be spent uniformly across its
//! lifetime, and only the share overlapping the window is counted.

use chrono::{DateTime, Duration, Utc};

use crate::types::UsageBlock;

/// Length of the trailing window in minutes
pub const BURN_RATE_WINDOW_MINUTES: i64 = 60;

fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}

/// Tokens a single block contributes to the window ending at `now`
///
/// Zero for gap blocks, blocks without a start time, blocks that ended
/// before the window, and zero-length blocks.
pub fn window_contribution(block: &UsageBlock, now: DateTime<Utc>) -> f64 {
    if block.is_gap {
        return 0.0;
    }
    let Some(start) = block.start_time else {
        return 0.0;
    };

    let window_open = now - Duration::minutes(BURN_RATE_WINDOW_MINUTES);
    let end = block.effective_end(now);
    if end < window_open {
        return 0.0;
    }

    let clipped_start = start.max(window_open);
    let clipped_end = end.min(now);
    if clipped_end <= clipped_start {
        return 0.0;
    }

    let lifetime = minutes_between(start, end);
    if lifetime <= 0.0 {
        return 0.0;
    }
    let in_window = minutes_between(clipped_start, clipped_end);
    block.total_tokens as f64 * (in_window / lifetime)
}

/// Tokens per minute consumed over the last hour
///
/// Returns 0 for an empty snapshot or when nothing overlaps the window.
pub fn compute_hourly_burn_rate(blocks: &[UsageBlock], now: DateTime<Utc>) -> f64 {
    let total: f64 = blocks.iter().map(|b| window_contribution(b, now)).sum();
    if total > 0.0 {
        total / BURN_RATE_WINDOW_MINUTES as f64
    } else {
        0.0
    }
}
