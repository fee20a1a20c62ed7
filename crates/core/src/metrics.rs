//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Sync runs (outcomes, queued jobs)
//! - Contact service calls (counts, latency)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Sync Metrics
// =============================================================================

/// Sync runs total by outcome.
pub static SYNC_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("listsync_sync_runs_total", "Total order sync runs"),
        &["outcome"], // "synced", "no_contact", "already_processed", "invalid_config", "failed"
    )
    .unwrap()
});

/// Sync jobs accepted by the queue.
pub static SYNC_JOBS_ENQUEUED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "listsync_sync_jobs_enqueued_total",
        "Total sync jobs enqueued",
    )
    .unwrap()
});

// =============================================================================
// Contact Service Metrics
// =============================================================================

/// Contact service requests by operation and result.
pub static CONTACT_API_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "listsync_contact_api_requests_total",
            "Total requests to the contact service",
        ),
        &["operation", "result"], // result: "success", "http_error", "timeout", "transport_error"
    )
    .unwrap()
});

/// Contact service request latency.
pub static CONTACT_API_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "listsync_contact_api_duration_seconds",
            "Duration of contact service requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SYNC_RUNS.clone()),
        Box::new(SYNC_JOBS_ENQUEUED.clone()),
        Box::new(CONTACT_API_REQUESTS.clone()),
        Box::new(CONTACT_API_DURATION.clone()),
    ]
}
