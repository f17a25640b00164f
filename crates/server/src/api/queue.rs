//! Queue API handlers: list jobs, remove jobs, bulk cleanup.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use fablearr_core::{DownloadError, DownloadStatus, JobFilter, JobStatus};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Maximum allowed limit for queue queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for queue queries
const DEFAULT_LIMIT: i64 = 100;

/// Default age cutoff for cleanup, in days
const DEFAULT_CLEANUP_DAYS: i64 = 7;

// ============================================================================
// Request/Response types
// ============================================================================

/// Query parameters for listing the queue
#[derive(Debug, Deserialize)]
pub struct ListQueueParams {
    /// Filter by job status
    pub status: Option<JobStatus>,
    /// Maximum number of jobs to return
    pub limit: Option<i64>,
    /// Pagination offset
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveJobParams {
    /// Also delete downloaded files. Defaults to true: removing a queue
    /// entry is the "clean everything up" operation.
    pub delete_files: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CleanupParams {
    pub older_than_days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub jobs: Vec<DownloadStatus>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub removed: usize,
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

/// GET /api/v1/queue
///
/// List download jobs, most recent first, with live transfer snapshots
/// omitted (use the per-job status endpoint for those).
pub async fn list_queue(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQueueParams>,
) -> Result<Json<QueueResponse>, impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut filter = JobFilter::new().with_limit(limit).with_offset(offset);
    if let Some(status) = params.status {
        filter = filter.with_status(status);
    }

    match state.manager().list_jobs(&filter).await {
        Ok(jobs) => {
            let count = jobs.len();
            Ok(Json(QueueResponse { jobs, count }))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// DELETE /api/v1/queue/{job_id}?delete_files=
///
/// Remove a job from the queue entirely: cancel its transfer, optionally
/// delete its files, and drop the job record.
pub async fn remove_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
    Query(params): Query<RemoveJobParams>,
) -> Result<Json<SuccessResponse>, impl IntoResponse> {
    let delete_files = params.delete_files.unwrap_or(true);

    match state.manager().delete_job(job_id, delete_files).await {
        Ok(()) => Ok(Json(SuccessResponse {
            message: format!("Download {} removed", job_id),
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

/// POST /api/v1/queue/cleanup?older_than_days=
///
/// Remove terminal jobs (and their leftover files) older than the cutoff.
pub async fn cleanup_queue(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CleanupParams>,
) -> Result<Json<CleanupResponse>, impl IntoResponse> {
    let older_than_days = params.older_than_days.unwrap_or(DEFAULT_CLEANUP_DAYS);
    if older_than_days < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "older_than_days must not be negative".to_string(),
            }),
        ));
    }

    match state.manager().cleanup(older_than_days).await {
        Ok(removed) => Ok(Json(CleanupResponse { removed })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
