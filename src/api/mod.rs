//! REST surface, one file per resource.
//!
//! Every handler returns the shared `{success, data, revisionId}` envelope,
//! so any response doubles as a revision checkpoint for the client.

mod datastore;
mod entries;
mod leaderboard;
mod members;
mod notifications;
mod tasks;

pub use datastore::*;
pub use entries::*;
pub use leaderboard::*;
pub use members::*;
pub use notifications::*;
pub use tasks::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::{AppError, AppErrorWithRevision};

/// Envelope for successful responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Handler result; the error side carries the revision too.
pub type ApiResult<T> = Result<ApiResponse<T>, AppErrorWithRevision>;

/// Wrap `data` in the success envelope.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse {
        success: true,
        data,
        revision_id,
    })
}

/// Wrap `err` in the error envelope.
pub fn error<T: Serialize>(err: AppError, revision_id: i64) -> ApiResult<T> {
    Err(AppErrorWithRevision {
        error: err,
        revision_id,
    })
}
