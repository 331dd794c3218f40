//! Point entry model matching the frontend PointEntry interface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{task_points, Task, CUSTOM_TASK_ID};

/// Extra points for a member's first logged entry of a calendar day.
pub const DAILY_BONUS_POINTS: u32 = 50;

/// One recorded instance of a member completing a task for points.
///
/// `timestamp` is event time, not insertion time. `daily_bonus` is computed
/// once at write time and never retroactively. Custom entries carry their own
/// name and point value under the reserved `"custom"` task id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointEntry {
    pub id: String,
    pub member_id: String,
    pub task_id: String,
    pub quantity: u32,
    pub timestamp: DateTime<Utc>,
    pub daily_bonus: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_task_points: Option<u32>,
}

impl PointEntry {
    /// Effective points for this entry against a task catalog.
    ///
    /// Custom point values take precedence over any catalog lookup; a task id
    /// missing from the catalog degrades to zero rather than failing.
    pub fn effective_points(&self, catalog: &[Task]) -> u64 {
        let base = if self.task_id == CUSTOM_TASK_ID {
            self.custom_task_points.unwrap_or(0)
        } else {
            task_points(catalog, &self.task_id)
                .or(self.custom_task_points)
                .unwrap_or(0)
        };

        let mut total = u64::from(base) * u64::from(self.quantity);
        if self.daily_bonus {
            total += u64::from(DAILY_BONUS_POINTS);
        }
        total
    }
}

/// Request body for logging a new point entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub member_id: String,
    pub task_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Event time; defaults to now when omitted.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_task_name: Option<String>,
    #[serde(default)]
    pub custom_task_points: Option<u32>,
}

fn default_quantity() -> u32 {
    1
}

/// Request body for editing an existing point entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    #[serde(default)]
    pub member_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}
