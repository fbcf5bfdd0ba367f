//! Next scheduled budget reset
//!
//! Resets happen at fixed local wall-clock hours. The schedule is either
//! the default daily sequence or a single custom hour.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;

use crate::error::{CcmonitorError, Result};

/// Default daily reset hours, ascending
pub const DEFAULT_RESET_HOURS: [u32; 5] = [4, 9, 14, 18, 23];

/// Validated reset schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetSchedule {
    /// [`DEFAULT_RESET_HOURS`]
    Default,
    /// A single reset per day at this hour
    Custom(u32),
}

impl ResetSchedule {
    /// Schedule for an optional custom hour
    pub fn from_custom_hour(hour: Option<u32>) -> Result<Self> {
        match hour {
            None => Ok(Self::Default),
            Some(h) if h <= 23 => Ok(Self::Custom(h)),
            Some(h) => Err(CcmonitorError::InvalidResetHour(h)),
        }
    }

    /// Reset hours, ascending
    pub fn hours(&self) -> &[u32] {
        match self {
            Self::Default => &DEFAULT_RESET_HOURS,
            Self::Custom(h) => std::slice::from_ref(h),
        }
    }

    /// Next reset at or after `now`
    ///
    /// An hour equal to the current one still counts as pending while the
    /// minute is exactly zero. When no hour remains today the first hour of
    /// the schedule on the next calendar day is used. The result always has
    /// minutes, seconds and sub-seconds zeroed.
    pub fn next_reset(&self, now: DateTime<Tz>) -> DateTime<Tz> {
        let hours = self.hours();
        let (current_hour, current_minute) = (now.hour(), now.minute());
        let today = now.date_naive();

        let upcoming = hours
            .iter()
            .copied()
            .find(|&h| h > current_hour || (h == current_hour && current_minute == 0));

        let (date, hour) = match upcoming {
            Some(h) => (today, h),
            None => (today + Duration::days(1), hours[0]),
        };
        at_local_hour(&now.timezone(), date, hour)
    }
}

/// Next reset for an optional custom hour
///
/// Out of range custom hours are rejected rather than clamped.
pub fn next_reset(now: DateTime<Tz>, custom_hour: Option<u32>) -> Result<DateTime<Tz>> {
    Ok(ResetSchedule::from_custom_hour(custom_hour)?.next_reset(now))
}

/// `date` at `hour`:00:00 local time
///
/// Ambiguous times (DST fall back) take the earlier instant. Times skipped
/// by a DST jump move forward one hour.
fn at_local_hour(tz: &Tz, date: NaiveDate, hour: u32) -> DateTime<Tz> {
    let naive = date.and_time(NaiveTime::default()) + Duration::hours(i64::from(hour));
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc_local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_mid_morning_goes_to_afternoon_slot() {
        let now = utc_local(2024, 7, 15, 10, 30, 0);
        assert_eq!(
            ResetSchedule::Default.next_reset(now),
            utc_local(2024, 7, 15, 14, 0, 0)
        );
    }

    #[test]
    fn test_late_night_rolls_to_next_day() {
        let now = utc_local(2024, 7, 15, 23, 30, 0);
        assert_eq!(
            ResetSchedule::Default.next_reset(now),
            utc_local(2024, 7, 16, 4, 0, 0)
        );
    }

    #[test]
    fn test_exact_hour_is_still_pending() {
        let now = utc_local(2024, 7, 15, 4, 0, 0);
        assert_eq!(
            ResetSchedule::Default.next_reset(now),
            utc_local(2024, 7, 15, 4, 0, 0)
        );
    }

    #[test]
    fn test_seconds_into_reset_minute_keep_the_hour() {
        // Only hour and minute are compared, so the reset lies 30s in the past
        let now = utc_local(2024, 7, 15, 23, 0, 30);
        let reset = ResetSchedule::Default.next_reset(now);
        assert_eq!(reset, utc_local(2024, 7, 15, 23, 0, 0));
        assert!(reset < now);
    }

    #[test]
    fn test_one_minute_past_moves_on() {
        let now = utc_local(2024, 7, 15, 4, 1, 0);
        assert_eq!(
            ResetSchedule::Default.next_reset(now),
            utc_local(2024, 7, 15, 9, 0, 0)
        );
    }

    #[test]
    fn test_month_end_rollover() {
        let now = utc_local(2024, 12, 31, 23, 59, 59);
        assert_eq!(
            ResetSchedule::Default.next_reset(now),
            utc_local(2025, 1, 1, 4, 0, 0)
        );
    }

    #[test]
    fn test_custom_hour() {
        let schedule = ResetSchedule::from_custom_hour(Some(17)).unwrap();
        assert_eq!(
            schedule.next_reset(utc_local(2024, 7, 15, 10, 30, 0)),
            utc_local(2024, 7, 15, 17, 0, 0)
        );
        assert_eq!(
            schedule.next_reset(utc_local(2024, 7, 15, 17, 30, 0)),
            utc_local(2024, 7, 16, 17, 0, 0)
        );
    }

    #[test]
    fn test_custom_hour_out_of_range() {
        assert!(matches!(
            next_reset(utc_local(2024, 7, 15, 10, 0, 0), Some(24)),
            Err(CcmonitorError::InvalidResetHour(24))
        ));
    }

    #[test]
    fn test_result_is_zeroed() {
        let now = Tz::UTC
            .with_ymd_and_hms(2024, 7, 15, 10, 30, 45)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let reset = ResetSchedule::Default.next_reset(now);
        assert_eq!((reset.minute(), reset.second(), reset.nanosecond()), (0, 0, 0));
    }

    #[test]
    fn test_wall_clock_is_local() {
        let tz = chrono_tz::Asia::Tokyo;
        // 10:30 in Tokyo, 01:30 UTC
        let now = tz.with_ymd_and_hms(2024, 7, 15, 10, 30, 0).unwrap();
        let reset = ResetSchedule::Default.next_reset(now);
        assert_eq!(reset, tz.with_ymd_and_hms(2024, 7, 15, 14, 0, 0).unwrap());
        assert_eq!(reset.naive_utc().hour(), 5);
    }

    #[test]
    fn test_dst_gap_moves_forward() {
        let tz = chrono_tz::America::New_York;
        // 2024-03-10 02:00 does not exist in New York
        let now = tz.with_ymd_and_hms(2024, 3, 10, 1, 15, 0).unwrap();
        let reset = ResetSchedule::Custom(2).next_reset(now);
        assert_eq!(reset, tz.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap());
    }
}
