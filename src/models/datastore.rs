//! Wire model for the full datastore snapshot.

use serde::{Deserialize, Serialize};

use super::{PointEntry, Task, TeamMember};

/// Everything a client renders from: the member directory, the static task
/// catalog, and the entry log, stamped with the revision it was read at.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datastore {
    pub members: Vec<TeamMember>,
    pub tasks: Vec<Task>,
    pub entries: Vec<PointEntry>,
    pub schema_version: i32,
    pub revision_id: i64,
    pub generated_at: String,
}

/// The revision counter alone, cheap enough to poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}
