//! Notification API endpoints.

use axum::extract::{Path, State};
use chrono::Utc;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::notify::Notification;
use crate::AppState;

/// GET /api/notifications - The still-active notifications.
pub async fn list_notifications(State(state): State<AppState>) -> ApiResult<Vec<Notification>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let active = state.notifications.active(Utc::now()).await;
    success(active, revision_id)
}

/// POST /api/notifications/:id/dismiss - Dismiss a notification early.
pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if state.notifications.dismiss(&id).await {
        success((), revision_id)
    } else {
        error(
            AppError::NotFound(format!("Notification {} not found", id)),
            revision_id,
        )
    }
}
