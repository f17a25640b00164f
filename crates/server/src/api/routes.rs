use axum::{
    middleware::from_fn,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::middleware::metrics_middleware;
use super::{catalog, downloads, handlers, queue, results};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Search result hand-off
        .route("/results", post(results::create_result))
        .route("/results/{id}", get(results::get_result))
        // Downloads (POST takes a search result id, GET/DELETE a job id)
        .route("/downloads/{id}", post(downloads::start_download))
        .route("/downloads/{id}", get(downloads::get_download))
        .route("/downloads/{id}", delete(downloads::cancel_download))
        // Queue
        .route("/queue", get(queue::list_queue))
        .route("/queue/cleanup", post(queue::cleanup_queue))
        .route("/queue/{job_id}", delete(queue::remove_job))
        // Media catalog
        .route("/catalog/libraries", get(catalog::list_libraries))
        .route("/catalog/libraries/{id}/scan", post(catalog::scan_library))
        // System
        .route("/system/status", get(handlers::system_status))
        .with_state(state.clone());

    // Prometheus scrape endpoint lives outside the API prefix
    let metrics_route = Router::new()
        .route("/metrics", get(handlers::metrics))
        .with_state(state.clone());

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .merge(metrics_route)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http());

    if state.config().server.cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}
