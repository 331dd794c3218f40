//! Task catalog API endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::models::{catalog, Task};
use crate::AppState;

/// GET /api/tasks - List the static task catalog.
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Vec<Task>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(catalog(), revision_id)
}
