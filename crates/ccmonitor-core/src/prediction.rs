//! Depletion prediction
//!
//! Whichever comes first wins: running out of tokens at the current burn
//! rate, or the next scheduled reset.

use chrono::{DateTime, Duration, Utc};

/// Predicted time the budget runs out, capped at `reset_time`
///
/// With no burn or no tokens left there is no depletion signal and the
/// reset time is returned unchanged.
///
/// # Examples
/// ```
/// use ccmonitor_core::prediction::predict_depletion;
/// use chrono::{Duration, TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
/// let reset = now + Duration::hours(3);
/// assert_eq!(predict_depletion(now, 50.0, 100, reset), now + Duration::minutes(2));
/// assert_eq!(predict_depletion(now, 0.0, 100, reset), reset);
/// ```
pub fn predict_depletion(
    now: DateTime<Utc>,
    burn_rate: f64,
    tokens_left: i64,
    reset_time: DateTime<Utc>,
) -> DateTime<Utc> {
    if burn_rate.is_nan() || burn_rate <= 0.0 || tokens_left <= 0 {
        return reset_time;
    }

    let minutes_to_depletion = tokens_left as f64 / burn_rate;
    let millis = minutes_to_depletion * 60_000.0;
    let millis_to_reset = (reset_time - now).num_milliseconds() as f64;
    // Also keeps the Duration below from overflowing
    if !millis.is_finite() || millis > millis_to_reset {
        return reset_time;
    }

    let candidate = now + Duration::milliseconds(millis.round() as i64);
    if candidate <= now {
        return reset_time;
    }
    candidate
}
