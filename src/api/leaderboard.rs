//! Leaderboard API endpoints.
//!
//! Aggregation runs on a snapshot read per request; nothing here is cached
//! or persisted, so a reload after any store change is always consistent.

use axum::extract::{Query, State};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::models::{catalog, TeamMember};
use crate::score::{
    self, leader::strict_leader, window, MemberStanding, SeriesPoint,
};
use crate::AppState;

/// Time window applied before aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Period {
    #[default]
    Week,
    All,
}

/// Leaderboard query parameters.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Time window (default: week).
    #[serde(default)]
    pub period: Period,
}

/// Directory info the chart legend needs, aligned with series values.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardMember {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<u32>,
}

impl From<&TeamMember> for LeaderboardMember {
    fn from(m: &TeamMember) -> Self {
        Self {
            id: m.id.clone(),
            name: m.name.clone(),
            color: m.color.clone(),
            face: m.face,
        }
    }
}

/// Aggregated leaderboard payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub period: Period,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_start: Option<DateTime<Utc>>,
    pub members: Vec<LeaderboardMember>,
    pub standings: Vec<MemberStanding>,
    pub series: Vec<SeriesPoint>,
    pub entry_count: usize,
}

/// GET /api/leaderboard - Totals, ranking, and chart series for a window.
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardQuery>,
) -> ApiResult<LeaderboardResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let members = match state.repo.list_members().await {
        Ok(members) => members,
        Err(e) => return error(e, revision_id),
    };
    let entries = match state.repo.list_entries().await {
        Ok(entries) => entries,
        Err(e) => return error(e, revision_id),
    };

    let cat = catalog();
    let now = Utc::now();

    let (totals, series, week_start, entry_count) = match params.period {
        Period::Week => {
            let start = window::week_start(now);
            let totals = score::member_totals(&entries, &cat, |t| window::in_week(t, start));
            let series = score::week_series(&entries, &cat, &members, now);
            let entry_count = entries
                .iter()
                .filter(|e| window::in_week(e.timestamp, start))
                .count();
            (totals, series, Some(start), entry_count)
        }
        Period::All => {
            let totals = score::member_totals(&entries, &cat, |_| true);
            let series = score::all_time_series(&entries, &cat, &members, now);
            (totals, series, None, entries.len())
        }
    };

    let standings = score::standings(&totals, &members);

    success(
        LeaderboardResponse {
            period: params.period,
            week_start,
            members: members.iter().map(LeaderboardMember::from).collect(),
            standings,
            series,
            entry_count,
        },
        revision_id,
    )
}

/// Last week's champion, when one member held a strict positive maximum.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastWeekWinner {
    pub member: LeaderboardMember,
    pub total: u64,
}

/// Last week query payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastWeekResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<LastWeekWinner>,
    pub week_start: DateTime<Utc>,
    pub week_end: DateTime<Utc>,
}

/// GET /api/leaderboard/last-week - The previous week's winner.
pub async fn get_last_week_winner(
    State(state): State<AppState>,
) -> ApiResult<LastWeekResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let members = match state.repo.list_members().await {
        Ok(members) => members,
        Err(e) => return error(e, revision_id),
    };
    let entries = match state.repo.list_entries().await {
        Ok(entries) => entries,
        Err(e) => return error(e, revision_id),
    };

    let cat = catalog();
    let start = window::last_week_start(Utc::now());
    let totals = score::member_totals(&entries, &cat, |t| window::in_week(t, start));
    let standings = score::standings(&totals, &members);

    // A winner outside the directory has nothing to show; degrade to none.
    let winner = strict_leader(&standings).and_then(|top| {
        members
            .iter()
            .find(|m| m.id == top.member_id)
            .map(|m| LastWeekWinner {
                member: LeaderboardMember::from(m),
                total: top.total,
            })
    });

    success(
        LastWeekResponse {
            winner,
            week_start: start,
            week_end: start + Duration::days(7),
        },
        revision_id,
    )
}
