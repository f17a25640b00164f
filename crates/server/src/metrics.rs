//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the fablearr server:
//! - HTTP request metrics (latency, counts, errors)
//! - Job counts by status (collected dynamically from the store)
//! - Download lifecycle metrics (registered from the core crate)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

use fablearr_core::JobStatus;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "fablearr_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("fablearr_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "fablearr_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Job Metrics (collected dynamically)
// =============================================================================

/// Jobs by current status.
pub static JOBS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("fablearr_jobs_by_status", "Current job count by status"),
        &["status"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Jobs
    registry
        .register(Box::new(JOBS_BY_STATUS.clone()))
        .unwrap();

    // Core metrics (download lifecycle, monitors, organization)
    for metric in fablearr_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding metrics to refresh the per-status job gauges
/// from the store.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    for status in [
        JobStatus::Pending,
        JobStatus::Starting,
        JobStatus::Downloading,
        JobStatus::Processing,
        JobStatus::Completed,
        JobStatus::CompletedWithWarning,
        JobStatus::Failed,
        JobStatus::Cancelled,
    ] {
        let filter = fablearr_core::JobFilter::new().with_status(status);
        if let Ok(count) = state.store().count_jobs(&filter) {
            JOBS_BY_STATUS.with_label_values(&[status.as_str()]).set(count);
        }
    }
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    // Catalog library ids are opaque strings assigned by Audiobookshelf;
    // job and result ids are numeric.
    let library_regex = regex_lite::Regex::new(r"/catalog/libraries/[^/]+").unwrap();
    let uuid_regex = regex_lite::Regex::new(
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    )
    .unwrap();
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();

    let result = library_regex.replace_all(path, "/catalog/libraries/{id}");
    let result = uuid_regex.replace_all(&result, "{id}");
    let result = numeric_regex.replace_all(&result, "/{id}$1");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric() {
        let path = "/api/v1/downloads/123";
        assert_eq!(normalize_path(path), "/api/v1/downloads/{id}");
    }

    #[test]
    fn test_normalize_path_numeric_middle() {
        let path = "/api/v1/queue/42/whatever";
        assert_eq!(normalize_path(path), "/api/v1/queue/{id}/whatever");
    }

    #[test]
    fn test_normalize_path_library_id() {
        let path = "/api/v1/catalog/libraries/lib_c1u2ozxhfq/scan";
        assert_eq!(normalize_path(path), "/api/v1/catalog/libraries/{id}/scan");
    }

    #[test]
    fn test_normalize_path_library_uuid() {
        let path = "/api/v1/catalog/libraries/550e8400-e29b-41d4-a716-446655440000/scan";
        assert_eq!(normalize_path(path), "/api/v1/catalog/libraries/{id}/scan");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        let path = "/api/v1/health";
        assert_eq!(normalize_path(path), "/api/v1/health");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        // Access metrics to ensure they're initialized
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("fablearr_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_all_metrics() {
        // Touch all metrics to ensure they appear in output
        // (Prometheus only outputs metrics that have been accessed)
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        JOBS_BY_STATUS.with_label_values(&["pending"]).set(0);
        fablearr_core::metrics::DOWNLOADS_STARTED.inc();
        fablearr_core::metrics::ACTIVE_MONITORS.set(0);

        let output = encode_metrics();

        // HTTP metrics
        assert!(output.contains("fablearr_http_request_duration_seconds"));
        assert!(output.contains("fablearr_http_requests_total"));
        assert!(output.contains("fablearr_http_requests_in_flight"));

        // Job metrics
        assert!(output.contains("fablearr_jobs_by_status"));

        // Core metrics registered through all_metrics()
        assert!(output.contains("fablearr_downloads_started_total"));
        assert!(output.contains("fablearr_active_monitors"));
    }
}
