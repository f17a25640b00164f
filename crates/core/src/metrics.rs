//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Download lifecycle (started, completed, failed, cancelled)
//! - Monitoring tasks
//! - Library organization

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntGauge};

// =============================================================================
// Download lifecycle metrics
// =============================================================================

/// Downloads started total.
pub static DOWNLOADS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("fablearr_downloads_started_total", "Total downloads started").unwrap()
});

/// Downloads completed total.
pub static DOWNLOADS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "fablearr_downloads_completed_total",
        "Total downloads completed successfully",
    )
    .unwrap()
});

/// Downloads completed with a cataloging warning.
pub static DOWNLOADS_COMPLETED_WITH_WARNING: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "fablearr_downloads_completed_with_warning_total",
        "Total downloads organized but not cataloged",
    )
    .unwrap()
});

/// Downloads failed total.
pub static DOWNLOADS_FAILED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "fablearr_downloads_failed_total",
        "Total downloads that failed",
    )
    .unwrap()
});

/// Downloads cancelled total.
pub static DOWNLOADS_CANCELLED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "fablearr_downloads_cancelled_total",
        "Total downloads cancelled by operators",
    )
    .unwrap()
});

/// Download duration in seconds, from job creation to a terminal state.
pub static DOWNLOAD_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("fablearr_download_duration_seconds", "Duration of downloads").buckets(
            vec![
                30.0, 60.0, 120.0, 300.0, 600.0, 1800.0, 3600.0, 7200.0, 14400.0,
            ],
        ),
        &["result"], // "completed", "completed_with_warning", "failed"
    )
    .unwrap()
});

// =============================================================================
// Monitoring metrics
// =============================================================================

/// Monitoring tasks currently running.
pub static ACTIVE_MONITORS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "fablearr_active_monitors",
        "Download monitor tasks currently running",
    )
    .unwrap()
});

// =============================================================================
// Organization metrics
// =============================================================================

/// Files copied into the library total.
pub static FILES_ORGANIZED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "fablearr_files_organized_total",
        "Total files copied into the library",
    )
    .unwrap()
});

/// Jobs removed by bulk cleanup.
pub static JOBS_CLEANED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "fablearr_jobs_cleaned_total",
        "Total jobs removed by cleanup",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(DOWNLOADS_STARTED.clone()),
        Box::new(DOWNLOADS_COMPLETED.clone()),
        Box::new(DOWNLOADS_COMPLETED_WITH_WARNING.clone()),
        Box::new(DOWNLOADS_FAILED.clone()),
        Box::new(DOWNLOADS_CANCELLED.clone()),
        Box::new(DOWNLOAD_DURATION.clone()),
        Box::new(ACTIVE_MONITORS.clone()),
        Box::new(FILES_ORGANIZED.clone()),
        Box::new(JOBS_CLEANED.clone()),
    ]
}
