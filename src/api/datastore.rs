//! Datastore snapshot endpoints.
//!
//! Clients poll the revision and reload the full snapshot when it bumps;
//! together these two reads are the pull side of change detection.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::models::{Datastore, RevisionInfo};
use crate::AppState;

/// GET /api/datastore - The full snapshot: directory, catalog, entry log.
pub async fn get_datastore(State(state): State<AppState>) -> ApiResult<Datastore> {
    match state.repo.get_datastore().await {
        Ok(snapshot) => {
            let revision_id = snapshot.revision_id;
            success(snapshot, revision_id)
        }
        Err(e) => error(e, 0),
    }
}

/// GET /api/datastore/revision - The current revision counter alone.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    match state.repo.get_revision_info().await {
        Ok(info) => {
            let revision_id = info.revision_id;
            success(info, revision_id)
        }
        Err(e) => error(e, 0),
    }
}
