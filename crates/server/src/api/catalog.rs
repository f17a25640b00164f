//! Media catalog API handlers (pass-through to the catalog service).

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use fablearr_core::{CatalogError, Library};
use serde::Serialize;

use crate::state::AppState;

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LibraryListResponse {
    pub libraries: Vec<Library>,
    pub count: usize,
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

/// GET /api/v1/catalog/libraries
///
/// List the catalog's libraries.
pub async fn list_libraries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LibraryListResponse>, impl IntoResponse> {
    match state.catalog().list_libraries().await {
        Ok(libraries) => {
            let count = libraries.len();
            Ok(Json(LibraryListResponse { libraries, count }))
        }
        Err(e) => Err((
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// POST /api/v1/catalog/libraries/{id}/scan
///
/// Trigger a scan of one library. Fire-and-forget on the catalog side;
/// a success here only means the catalog accepted the request.
pub async fn scan_library(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, impl IntoResponse> {
    match state.catalog().scan_library(&id).await {
        Ok(()) => Ok(Json(SuccessResponse {
            message: format!("Scan started for library {}", id),
        })),
        Err(CatalogError::ApiError { status: 404, .. }) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Library not found: {}", id),
            }),
        )),
        Err(e) => Err((
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
