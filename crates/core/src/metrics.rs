//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Upstream calls (AniList, Jikan, YouTube) and rate-limit hits
//! - Embeddability verification and search fallback
//! - Per-entry resolution outcomes

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Upstream Metrics
// =============================================================================

/// Upstream requests total.
pub static UPSTREAM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("anitrail_upstream_requests_total", "Total upstream requests"),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Upstream request duration in seconds.
pub static UPSTREAM_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "anitrail_upstream_duration_seconds",
            "Duration of upstream calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// Explicit "too many requests" responses.
pub static RATE_LIMIT_HITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "anitrail_rate_limit_hits_total",
            "Rate-limit responses received from upstreams",
        ),
        &["service"],
    )
    .unwrap()
});

// =============================================================================
// Verification Metrics
// =============================================================================

/// Embeddability verifications by verdict and whether the cache answered.
pub static VERIFICATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "anitrail_verifications_total",
            "Embeddability checks performed",
        ),
        &["verdict", "cached"], // verdict: "embeddable", "not_embeddable"
    )
    .unwrap()
});

/// Search fallback queries by whether the cache answered.
pub static SEARCH_QUERIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("anitrail_search_queries_total", "Search fallback queries"),
        &["cached"],
    )
    .unwrap()
});

/// Candidate ids extracted per search query.
pub static SEARCH_CANDIDATES: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "anitrail_search_candidates",
            "Number of video ids extracted per search page",
        )
        .buckets(vec![0.0, 1.0, 3.0, 6.0, 9.0, 12.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Resolution Metrics
// =============================================================================

/// Final resolution outcome per entry.
pub static RESOLUTION_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "anitrail_resolution_outcomes_total",
            "Per-entry trailer resolution outcomes",
        ),
        &["outcome"], // "verified", "replaced", "removed", "not_found", "cleared"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Upstreams
        Box::new(UPSTREAM_REQUESTS.clone()),
        Box::new(UPSTREAM_DURATION.clone()),
        Box::new(RATE_LIMIT_HITS.clone()),
        // Verification
        Box::new(VERIFICATIONS.clone()),
        Box::new(SEARCH_QUERIES.clone()),
        Box::new(SEARCH_CANDIDATES.clone()),
        // Resolution
        Box::new(RESOLUTION_OUTCOMES.clone()),
    ]
}

/// Record the outcome of one upstream call.
pub fn record_upstream(service: &str, operation: &str, success: bool, elapsed_secs: f64) {
    let status = if success { "success" } else { "error" };
    UPSTREAM_REQUESTS
        .with_label_values(&[service, operation, status])
        .inc();
    UPSTREAM_DURATION
        .with_label_values(&[service, operation])
        .observe(elapsed_secs);
}
