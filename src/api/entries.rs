//! Point entry API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateEntryRequest, PointEntry, UpdateEntryRequest, CUSTOM_TASK_ID};
use crate::notify::{ChangeOp, Collection};
use crate::AppState;

/// Response body for a delete: the refreshed log plus the undo token when
/// the delete was applied.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntryResponse {
    pub entries: Vec<PointEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undo_token: Option<String>,
}

/// Response body for a restore: the refreshed log plus the re-created entry
/// when the insert was applied.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreEntryResponse {
    pub entries: Vec<PointEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<PointEntry>,
}

/// GET /api/entries - List all entries, newest first.
pub async fn list_entries(State(state): State<AppState>) -> ApiResult<Vec<PointEntry>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_entries().await {
        Ok(entries) => success(entries, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/entries - Log a new point entry.
pub async fn create_entry(
    State(state): State<AppState>,
    Json(request): Json<CreateEntryRequest>,
) -> ApiResult<PointEntry> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    // Validate required fields before any store call
    if request.member_id.trim().is_empty() {
        return error(
            AppError::Validation("Member is required".to_string()),
            revision_id,
        );
    }
    if request.task_id.trim().is_empty() {
        return error(
            AppError::Validation("Task is required".to_string()),
            revision_id,
        );
    }
    if request.quantity < 1 {
        return error(
            AppError::Validation("Quantity must be at least 1".to_string()),
            revision_id,
        );
    }
    if request.task_id == CUSTOM_TASK_ID {
        let has_name = request
            .custom_task_name
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty());
        if !has_name {
            return error(
                AppError::Validation("Custom task name is required".to_string()),
                revision_id,
            );
        }
        if !request.custom_task_points.is_some_and(|p| p >= 1) {
            return error(
                AppError::Validation("Custom task points must be at least 1".to_string()),
                revision_id,
            );
        }
    } else if request.custom_task_points == Some(0) {
        return error(
            AppError::Validation("Custom task points must be at least 1".to_string()),
            revision_id,
        );
    }

    match state.repo.insert_entry(&request).await {
        Ok(entry) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            state
                .feed
                .emit(Collection::Entries, ChangeOp::Insert, new_revision);
            success(entry, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/entries/:id - Edit an entry (member/task/quantity).
pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateEntryRequest>,
) -> ApiResult<PointEntry> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.member_id.as_deref().is_some_and(|m| m.trim().is_empty()) {
        return error(
            AppError::Validation("Member must not be empty".to_string()),
            revision_id,
        );
    }
    if request.task_id.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return error(
            AppError::Validation("Task must not be empty".to_string()),
            revision_id,
        );
    }
    if request.quantity.is_some_and(|q| q < 1) {
        return error(
            AppError::Validation("Quantity must be at least 1".to_string()),
            revision_id,
        );
    }

    // Moving an ordinary entry onto the custom task would strand it without
    // a point value; reject unless the entry already carries custom fields.
    if request.task_id.as_deref() == Some(CUSTOM_TASK_ID) {
        match state.repo.get_entry(&id).await {
            Ok(Some(existing)) if existing.custom_task_points.is_none() => {
                return error(
                    AppError::Validation(
                        "Entry has no custom point value to switch to".to_string(),
                    ),
                    revision_id,
                );
            }
            Ok(_) => {}
            Err(e) => return error(e, revision_id),
        }
    }

    match state.repo.update_entry(&id, &request).await {
        Ok(entry) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            state
                .feed
                .emit(Collection::Entries, ChangeOp::Update, new_revision);
            success(entry, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/entries/:id - Delete an entry, keeping it restorable for the
/// undo window.
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeleteEntryResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state
        .undo
        .delete(&state.repo, &state.notifications, &state.feed, &id)
        .await
    {
        Ok(outcome) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(
                DeleteEntryResponse {
                    entries: outcome.entries,
                    undo_token: outcome.undo_token,
                },
                new_revision,
            )
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/entries/restore/:token - Re-create a deleted entry from its
/// snapshot before the undo window lapses.
pub async fn restore_entry(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<RestoreEntryResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.undo.restore(&state.repo, &state.feed, &token).await {
        Ok(outcome) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(
                RestoreEntryResponse {
                    entries: outcome.entries,
                    entry: outcome.entry,
                },
                new_revision,
            )
        }
        Err(e) => error(e, revision_id),
    }
}
