//! Timezone-aware day-window helpers
//!
//! All day boundaries (daily dedup window, stat row dates, the incremental
//! fetch cutoff) are computed in one configured named timezone and then
//! converted back to UTC for storage and comparison.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;

/// Half-open UTC interval `[start, end)` covering one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// The local calendar day containing `instant`, as a UTC interval.
///
/// DST gaps around local midnight resolve to the earliest valid instant of
/// that day.
pub fn day_window(tz: Tz, instant: DateTime<Utc>) -> DayWindow {
    let local_day = instant.with_timezone(&tz).date_naive();
    let start_naive = local_day.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    let start = match tz.from_local_datetime(&start_naive) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(earliest, _) => earliest,
        chrono::LocalResult::None => {
            // Local midnight skipped by a DST transition; walk forward to
            // the first valid instant of the day.
            let mut probe = start_naive;
            let limit = start_naive + Duration::hours(6);
            loop {
                probe += Duration::minutes(30);
                if let chrono::LocalResult::Single(dt) = tz.from_local_datetime(&probe) {
                    break dt;
                }
                if probe >= limit {
                    break tz.from_utc_datetime(&start_naive);
                }
            }
        }
    };
    DayWindow {
        start: start.with_timezone(&Utc),
        end: start.with_timezone(&Utc) + Duration::days(1),
    }
}

/// Start of the local calendar day containing `instant`, in UTC.
pub fn start_of_day(tz: Tz, instant: DateTime<Utc>) -> DateTime<Utc> {
    day_window(tz, instant).start
}

/// The local calendar date of `instant`, formatted `YYYY-MM-DD`.
pub fn local_date_string(tz: Tz, instant: DateTime<Utc>) -> String {
    instant.with_timezone(&tz).format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Seoul;

    #[test]
    fn seoul_day_window_spans_utc_offset() {
        // 2023-06-15 01:00 KST == 2023-06-14 16:00 UTC
        let instant = Utc.with_ymd_and_hms(2023, 6, 14, 16, 0, 0).unwrap();
        let window = day_window(Seoul, instant);
        // KST day starts at 2023-06-14 15:00 UTC
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2023, 6, 14, 15, 0, 0).unwrap()
        );
        assert_eq!(window.end - window.start, Duration::days(1));
        assert!(window.contains(instant));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn local_date_differs_from_utc_date_near_midnight() {
        let instant = Utc.with_ymd_and_hms(2023, 6, 14, 16, 0, 0).unwrap();
        assert_eq!(local_date_string(Seoul, instant), "2023-06-15");
    }
}
