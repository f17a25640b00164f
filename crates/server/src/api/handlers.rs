//! Basic API handlers: health, config, metrics, and system status.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use fablearr_core::{SanitizedConfig, TransferRate};

use crate::state::AppState;

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct SystemStatusResponse {
    pub daemon: DaemonStatus,
    pub catalog: CatalogStatus,
    pub active_monitors: usize,
}

/// Reachability of the transfer daemon, probed via its transfer-rate endpoint.
#[derive(Debug, Serialize)]
pub struct DaemonStatus {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_rate: Option<TransferRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reachability of the media catalog, probed via its library listing.
#[derive(Debug, Serialize)]
pub struct CatalogStatus {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libraries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/health
///
/// Liveness check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /api/v1/config
///
/// Get the current configuration with secrets redacted.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// GET /metrics
///
/// Prometheus metrics in text format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    crate::metrics::collect_dynamic_metrics(&state);
    crate::metrics::encode_metrics()
}

/// GET /api/v1/system/status
///
/// Integration health: reachability of the transfer daemon and the media
/// catalog, plus the number of running download monitors.
pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatusResponse> {
    let daemon = match state.torrent_client().transfer_rate().await {
        Ok(rate) => DaemonStatus {
            reachable: true,
            transfer_rate: Some(rate),
            error: None,
        },
        Err(e) => DaemonStatus {
            reachable: false,
            transfer_rate: None,
            error: Some(e.to_string()),
        },
    };

    let catalog = match state.catalog().list_libraries().await {
        Ok(libraries) => CatalogStatus {
            reachable: true,
            libraries: Some(libraries.len()),
            error: None,
        },
        Err(e) => CatalogStatus {
            reachable: false,
            libraries: None,
            error: Some(e.to_string()),
        },
    };

    let active_monitors = state.manager().active_monitor_count().await;

    Json(SystemStatusResponse {
        daemon,
        catalog,
        active_monitors,
    })
}
