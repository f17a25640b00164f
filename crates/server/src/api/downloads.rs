//! Download API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use fablearr_core::{DownloadError, DownloadJob, DownloadStatus};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CancelParams {
    #[serde(default)]
    pub delete_files: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/downloads/{result_id}
///
/// Start a download for a previously ingested search result.
pub async fn start_download(
    State(state): State<Arc<AppState>>,
    Path(result_id): Path<i64>,
) -> Result<(StatusCode, Json<DownloadJob>), impl IntoResponse> {
    match state.manager().start_download(result_id).await {
        Ok(job) => Ok((StatusCode::CREATED, Json(job))),
        Err(DownloadError::SearchResultNotFound(id)) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Search result not found: {}", id),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// GET /api/v1/downloads/{job_id}
///
/// Get the status of a download job, with a live transfer snapshot while
/// the daemon still tracks it.
pub async fn get_download(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
) -> Result<Json<DownloadStatus>, impl IntoResponse> {
    match state.manager().get_status(job_id).await {
        Ok(Some(status)) => Ok(Json(status)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Download job not found: {}", job_id),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// DELETE /api/v1/downloads/{job_id}?delete_files=
///
/// Cancel a download job. Cancelling an already-terminal job is a no-op.
pub async fn cancel_download(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
    Query(params): Query<CancelParams>,
) -> Result<Json<SuccessResponse>, impl IntoResponse> {
    match state.manager().cancel(job_id, params.delete_files).await {
        Ok(()) => Ok(Json(SuccessResponse {
            message: format!("Download {} cancelled", job_id),
        })),
        Err(DownloadError::JobNotFound(id)) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Download job not found: {}", id),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
