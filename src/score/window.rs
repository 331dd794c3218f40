//! Time-window utilities for weekly and daily boundaries.
//!
//! Weeks start Monday at 00:00 UTC and span seven days; the same boundary
//! rules feed the weekly sums, the chart series, and the last-week winner.
//! Day boundaries (for the daily bonus) are UTC midnight to midnight,
//! independent of week boundaries.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

/// Midnight at the start of the timestamp's day.
pub fn day_start(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Half-open `[start, end)` bounds of the timestamp's day.
pub fn day_bounds(t: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day_start(t);
    (start, start + Duration::days(1))
}

/// Monday 00:00 of the timestamp's week.
pub fn week_start(t: DateTime<Utc>) -> DateTime<Utc> {
    let days_into_week = i64::from(t.weekday().num_days_from_monday());
    day_start(t) - Duration::days(days_into_week)
}

/// Monday 00:00 of the week before the timestamp's week.
pub fn last_week_start(t: DateTime<Utc>) -> DateTime<Utc> {
    week_start(t) - Duration::days(7)
}

/// Whether `t` falls inside the week beginning at `start`.
pub fn in_week(t: DateTime<Utc>, start: DateTime<Utc>) -> bool {
    t >= start && t < start + Duration::days(7)
}

/// The seven day-start timestamps of the timestamp's week, Monday first.
pub fn week_days(t: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let start = week_start(t);
    (0..7).map(|i| start + Duration::days(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_week_starts_monday() {
        // 2024-06-13 is a Thursday
        let thursday = utc(2024, 6, 13, 15, 30, 0);
        assert_eq!(week_start(thursday), utc(2024, 6, 10, 0, 0, 0));

        // A Monday is its own week start
        let monday = utc(2024, 6, 10, 0, 0, 0);
        assert_eq!(week_start(monday), monday);

        // Sunday belongs to the week that began the previous Monday
        let sunday = utc(2024, 6, 16, 23, 59, 59);
        assert_eq!(week_start(sunday), utc(2024, 6, 10, 0, 0, 0));
    }

    #[test]
    fn test_in_week_bounds() {
        let start = utc(2024, 6, 10, 0, 0, 0);
        // Start is inclusive
        assert!(in_week(start, start));
        // End is exclusive
        assert!(!in_week(utc(2024, 6, 17, 0, 0, 0), start));
        assert!(in_week(utc(2024, 6, 16, 23, 59, 59), start));
        // Before the window
        assert!(!in_week(utc(2024, 6, 9, 23, 59, 59), start));
    }

    #[test]
    fn test_last_week_start() {
        let thursday = utc(2024, 6, 13, 12, 0, 0);
        assert_eq!(last_week_start(thursday), utc(2024, 6, 3, 0, 0, 0));
    }

    #[test]
    fn test_day_bounds() {
        let t = utc(2024, 6, 13, 15, 30, 0);
        let (start, end) = day_bounds(t);
        assert_eq!(start, utc(2024, 6, 13, 0, 0, 0));
        assert_eq!(end, utc(2024, 6, 14, 0, 0, 0));
    }

    #[test]
    fn test_week_days() {
        let days = week_days(utc(2024, 6, 13, 12, 0, 0));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], utc(2024, 6, 10, 0, 0, 0));
        assert_eq!(days[6], utc(2024, 6, 16, 0, 0, 0));
    }
}
