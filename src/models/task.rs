//! Task catalog model.
//!
//! The catalog is static reference data compiled into the binary; it is never
//! mutated at runtime. Entries may also reference the reserved `"custom"` task
//! id together with a free-form name and point value.

use serde::{Deserialize, Serialize};

/// Reserved task id marking a free-form custom entry.
pub const CUSTOM_TASK_ID: &str = "custom";

/// A recognized task with a fixed point value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub points: u32,
}

impl Task {
    fn new(id: &str, name: &str, points: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            points,
        }
    }
}

/// The static task catalog.
pub fn catalog() -> Vec<Task> {
    vec![
        Task::new("1", "Found a new lead", 1),
        Task::new("2", "Made a new post", 11),
        Task::new("3", "Sent media used in a post", 10),
        Task::new("4", "Wrote caption used in a post", 5),
        Task::new("5", "Gave someone a business card", 3),
        Task::new("6", "Made a site mockup", 10),
        Task::new("7", "Published a site", 35),
    ]
}

/// Look up a task's point value by id.
pub fn task_points(catalog: &[Task], task_id: &str) -> Option<u32> {
    catalog.iter().find(|t| t.id == task_id).map(|t| t.points)
}

/// Look up a task's display name by id.
pub fn task_name(catalog: &[Task], task_id: &str) -> Option<String> {
    catalog
        .iter()
        .find(|t| t.id == task_id)
        .map(|t| t.name.clone())
}
