//! Points aggregation engine.
//!
//! Derives per-member totals, rankings, and cumulative chart series from the
//! raw entry log. The engine only borrows a snapshot of the entries; it never
//! mutates them, and it never fails on dangling references: unknown tasks
//! score zero and unknown members rank under a placeholder name.

pub mod leader;
pub mod window;

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{PointEntry, Task, TeamMember};

/// Placeholder name for entries whose member is missing from the directory.
pub const UNKNOWN_MEMBER_NAME: &str = "Unknown";

/// The all-time chart keeps at most this many trailing weeks.
pub const ALL_TIME_SERIES_WEEKS: usize = 12;

/// One member's aggregated total for the active window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStanding {
    pub member_id: String,
    pub name: String,
    pub total: u64,
}

/// One x-axis point of a cumulative chart series.
///
/// `values` is aligned with the member directory ordering used to build it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub label: String,
    pub values: Vec<u64>,
}

/// Sum effective points per member over entries matching the window predicate.
pub fn member_totals<F>(
    entries: &[PointEntry],
    catalog: &[Task],
    in_window: F,
) -> HashMap<String, u64>
where
    F: Fn(DateTime<Utc>) -> bool,
{
    let mut totals: HashMap<String, u64> = HashMap::new();
    for entry in entries.iter().filter(|e| in_window(e.timestamp)) {
        *totals.entry(entry.member_id.clone()).or_insert(0) += entry.effective_points(catalog);
    }
    totals
}

/// Rank members by total, descending.
///
/// The sort is stable, so ties keep the directory order. Totals for member
/// ids missing from the directory are appended as placeholder rows rather
/// than dropped, keeping the ranking sum equal to the window sum.
pub fn standings(totals: &HashMap<String, u64>, members: &[TeamMember]) -> Vec<MemberStanding> {
    let mut rows: Vec<MemberStanding> = members
        .iter()
        .map(|m| MemberStanding {
            member_id: m.id.clone(),
            name: m.name.clone(),
            total: totals.get(&m.id).copied().unwrap_or(0),
        })
        .collect();

    let mut dangling: Vec<&String> = totals
        .keys()
        .filter(|id| !members.iter().any(|m| &m.id == *id))
        .collect();
    dangling.sort();
    for id in dangling {
        rows.push(MemberStanding {
            member_id: id.clone(),
            name: UNKNOWN_MEMBER_NAME.to_string(),
            total: totals[id],
        });
    }

    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

/// Cumulative per-day series for the current week, one point per day up to
/// and including today. Each value is the member's running total through the
/// end of that day, restricted to this week's entries.
pub fn week_series(
    entries: &[PointEntry],
    catalog: &[Task],
    members: &[TeamMember],
    now: DateTime<Utc>,
) -> Vec<SeriesPoint> {
    let start = window::week_start(now);
    let today = window::day_start(now);

    window::week_days(now)
        .into_iter()
        .filter(|day| *day <= today)
        .map(|day| {
            let day_end = day + Duration::days(1);
            let values = members
                .iter()
                .map(|m| {
                    entries
                        .iter()
                        .filter(|e| {
                            e.member_id == m.id
                                && window::in_week(e.timestamp, start)
                                && e.timestamp < day_end
                        })
                        .map(|e| e.effective_points(catalog))
                        .sum()
                })
                .collect();
            SeriesPoint {
                label: day.format("%a").to_string(),
                values,
            }
        })
        .collect()
}

/// Cumulative per-week series from the first entry's week to now, capped to
/// the most recent [`ALL_TIME_SERIES_WEEKS`]. Each value is the member's
/// total over all entries before the week's exclusive end boundary.
pub fn all_time_series(
    entries: &[PointEntry],
    catalog: &[Task],
    members: &[TeamMember],
    now: DateTime<Utc>,
) -> Vec<SeriesPoint> {
    let Some(first) = entries.iter().map(|e| e.timestamp).min() else {
        return Vec::new();
    };

    let mut weeks = Vec::new();
    let mut cursor = window::week_start(first);
    while cursor <= now {
        weeks.push(cursor);
        cursor += Duration::days(7);
    }
    if weeks.len() > ALL_TIME_SERIES_WEEKS {
        weeks = weeks.split_off(weeks.len() - ALL_TIME_SERIES_WEEKS);
    }

    weeks
        .into_iter()
        .map(|week| {
            let week_end = week + Duration::days(7);
            let values = members
                .iter()
                .map(|m| {
                    entries
                        .iter()
                        .filter(|e| e.member_id == m.id && e.timestamp < week_end)
                        .map(|e| e.effective_points(catalog))
                        .sum()
                })
                .collect();
            SeriesPoint {
                label: week.format("%b %-d").to_string(),
                values,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{catalog, CUSTOM_TASK_ID};
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn member(id: &str, name: &str) -> TeamMember {
        TeamMember {
            id: id.to_string(),
            name: name.to_string(),
            avatar: None,
            color: None,
            face: None,
            created_at: String::new(),
        }
    }

    fn entry(id: &str, member_id: &str, task_id: &str, quantity: u32, at: DateTime<Utc>) -> PointEntry {
        PointEntry {
            id: id.to_string(),
            member_id: member_id.to_string(),
            task_id: task_id.to_string(),
            quantity,
            timestamp: at,
            daily_bonus: false,
            custom_task_name: None,
            custom_task_points: None,
        }
    }

    // Two members, a 5-point and a 10-point catalog task, one shared week.
    // 2024-06-10 is a Monday.
    fn fixture() -> (Vec<TeamMember>, Vec<PointEntry>, DateTime<Utc>) {
        let members = vec![member("alex@q.com", "Alex"), member("jordan@q.com", "Jordan")];
        let entries = vec![
            // Alex: 2 x task "4" (5 pts) = 10
            entry("e1", "alex@q.com", "4", 2, utc(2024, 6, 10, 9)),
            // Jordan: 1 x task "3" (10 pts) = 10
            entry("e2", "jordan@q.com", "3", 1, utc(2024, 6, 10, 10)),
        ];
        (members, entries, utc(2024, 6, 13, 12))
    }

    #[test]
    fn test_tied_totals_keep_directory_order() {
        let (members, entries, now) = fixture();
        let start = window::week_start(now);
        let totals = member_totals(&entries, &catalog(), |t| window::in_week(t, start));
        let ranked = standings(&totals, &members);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "Alex");
        assert_eq!(ranked[0].total, 10);
        assert_eq!(ranked[1].name, "Jordan");
        assert_eq!(ranked[1].total, 10);
    }

    #[test]
    fn test_totals_conserve_window_sum() {
        let (members, mut entries, now) = fixture();
        // Entry outside the window must not contribute
        entries.push(entry("e3", "alex@q.com", "7", 1, utc(2024, 5, 1, 9)));

        let start = window::week_start(now);
        let cat = catalog();
        let totals = member_totals(&entries, &cat, |t| window::in_week(t, start));

        let window_sum: u64 = entries
            .iter()
            .filter(|e| window::in_week(e.timestamp, start))
            .map(|e| e.effective_points(&cat))
            .sum();
        let standings_sum: u64 = standings(&totals, &members).iter().map(|s| s.total).sum();

        assert_eq!(window_sum, 20);
        assert_eq!(standings_sum, window_sum);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let (members, entries, now) = fixture();
        let start = window::week_start(now);
        let cat = catalog();

        let first = standings(&member_totals(&entries, &cat, |t| window::in_week(t, start)), &members);
        let second = standings(&member_totals(&entries, &cat, |t| window::in_week(t, start)), &members);

        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_member_gets_placeholder_row() {
        let (members, mut entries, now) = fixture();
        entries.push(entry("e3", "ghost@q.com", "3", 1, utc(2024, 6, 11, 9)));

        let start = window::week_start(now);
        let totals = member_totals(&entries, &catalog(), |t| window::in_week(t, start));
        let ranked = standings(&totals, &members);

        assert_eq!(ranked.len(), 3);
        let ghost = ranked
            .iter()
            .find(|s| s.member_id == "ghost@q.com")
            .expect("dangling member id should still rank");
        assert_eq!(ghost.name, UNKNOWN_MEMBER_NAME);
        assert_eq!(ghost.total, 10);
    }

    #[test]
    fn test_custom_entry_points_override_catalog() {
        let members = vec![member("alex@q.com", "Alex")];
        let mut e = entry("e1", "alex@q.com", CUSTOM_TASK_ID, 1, utc(2024, 6, 10, 9));
        e.custom_task_name = Some("Helped client demo".to_string());
        e.custom_task_points = Some(30);
        let entries = vec![e];

        let now = utc(2024, 6, 13, 12);
        let start = window::week_start(now);
        let totals = member_totals(&entries, &catalog(), |t| window::in_week(t, start));
        let ranked = standings(&totals, &members);

        assert_eq!(ranked[0].total, 30);
    }

    #[test]
    fn test_week_series_is_cumulative_through_today() {
        let (members, entries, now) = fixture();
        let series = week_series(&entries, &catalog(), &members, now);

        // Monday through Thursday
        assert_eq!(series.len(), 4);
        assert_eq!(series[0].label, "Mon");
        assert_eq!(series[3].label, "Thu");
        // Both entries landed Monday; totals stay flat through the week
        assert_eq!(series[0].values, vec![10, 10]);
        assert_eq!(series[3].values, vec![10, 10]);
    }

    #[test]
    fn test_week_series_excludes_other_weeks() {
        let (members, mut entries, now) = fixture();
        entries.push(entry("e3", "alex@q.com", "7", 1, utc(2024, 6, 3, 9)));

        let series = week_series(&entries, &catalog(), &members, now);
        // Last week's 35-point entry must not leak into this week's series
        assert_eq!(series[3].values, vec![10, 10]);
    }

    #[test]
    fn test_all_time_series_cumulative_and_capped() {
        let members = vec![member("alex@q.com", "Alex")];
        let mut entries = Vec::new();
        // One 1-point entry per week for 20 weeks
        for i in 0..20_i64 {
            entries.push(entry(
                &format!("e{}", i),
                "alex@q.com",
                "1",
                1,
                utc(2024, 1, 1, 9) + Duration::days(7 * i),
            ));
        }
        let now = utc(2024, 1, 1, 9) + Duration::days(7 * 19 + 3);

        let series = all_time_series(&entries, &catalog(), &members, now);
        assert_eq!(series.len(), ALL_TIME_SERIES_WEEKS);
        // Last point counts every entry so far
        assert_eq!(series.last().map(|p| p.values[0]), Some(20));
        // Cumulative values never decrease
        for pair in series.windows(2) {
            assert!(pair[0].values[0] <= pair[1].values[0]);
        }
    }

    #[test]
    fn test_all_time_series_empty_entries() {
        let members = vec![member("alex@q.com", "Alex")];
        let series = all_time_series(&[], &catalog(), &members, utc(2024, 6, 13, 12));
        assert!(series.is_empty());
    }
}
