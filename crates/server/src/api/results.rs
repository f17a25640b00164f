//! Search result ingestion API handlers.
//!
//! The search subsystem lives outside this service; these endpoints are the
//! hand-off point where it deposits ranked results for operators to act on.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use fablearr_core::{NewSearchResult, SearchResult};
use serde::Serialize;

use crate::state::AppState;

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/results
///
/// Ingest a search result record.
pub async fn create_result(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewSearchResult>,
) -> Result<(StatusCode, Json<SearchResult>), impl IntoResponse> {
    if body.title.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "title must not be empty".to_string(),
            }),
        ));
    }

    match state.store().insert_search_result(body) {
        Ok(result) => Ok((StatusCode::CREATED, Json(result))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// GET /api/v1/results/{id}
///
/// Get a search result by id.
pub async fn get_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SearchResult>, impl IntoResponse> {
    match state.store().get_search_result(id) {
        Ok(Some(result)) => Ok(Json(result)),
        Ok(None) => Err((
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
