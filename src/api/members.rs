//! Member API endpoints.
//!
//! The member directory is written only through sign-in registration and
//! profile customization; members are never deleted.

use axum::{extract::State, Extension, Json};

use super::{error, success, ApiResult};
use crate::auth::Principal;
use crate::avatar::FACE_VARIANT_COUNT;
use crate::errors::AppError;
use crate::models::{TeamMember, UpdateProfileRequest};
use crate::notify::{ChangeOp, Collection};
use crate::AppState;

/// GET /api/members - List all members in creation order.
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Vec<TeamMember>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_members().await {
        Ok(members) => success(members, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/members/register - Upsert the caller on sign-in.
///
/// First registration assigns the round-robin color and avatar face;
/// re-registration only refreshes the display name.
pub async fn register_member(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<TeamMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state
        .repo
        .register_member(&principal.email, &principal.name)
        .await
    {
        Ok((member, created)) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            if new_revision != revision_id {
                let op = if created {
                    ChangeOp::Insert
                } else {
                    ChangeOp::Update
                };
                state.feed.emit(Collection::Users, op, new_revision);
            }
            success(member, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/members/profile - Update the caller's avatar customization.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<TeamMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    // Validate before any store call
    if let Some(face) = request.face {
        if face >= FACE_VARIANT_COUNT {
            return error(
                AppError::Validation(format!(
                    "Face index must be below {}",
                    FACE_VARIANT_COUNT
                )),
                revision_id,
            );
        }
    }
    if let Some(color) = &request.color {
        if color.trim().is_empty() {
            return error(
                AppError::Validation("Color must not be empty".to_string()),
                revision_id,
            );
        }
    }

    match state.repo.update_profile(&principal.email, &request).await {
        Ok(member) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            state
                .feed
                .emit(Collection::Users, ChangeOp::Update, new_revision);
            success(member, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
