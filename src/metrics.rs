// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for rrstate.
//!
//! All metrics carry the namespace prefix `rrstate_`.
//!
//! # Metrics Categories
//!
//! - **Lifecycle Metrics** - create, read, update, delete and import outcomes
//! - **Drift Metrics** - fields realigned from the provider during reads
//! - **API Metrics** - provider HTTP requests and their latency
//!
//! # Example
//!
//! ```rust
//! use rrstate::metrics::{gather_metrics, record_lifecycle_operation};
//!
//! record_lifecycle_operation("read", "present");
//! assert!(gather_metrics().unwrap().contains("rrstate_lifecycle_operations_total"));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all rrstate metrics
const METRICS_NAMESPACE: &str = "rrstate";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Lifecycle Metrics
// ============================================================================

/// Total number of lifecycle operations by operation and outcome
///
/// Labels:
/// - `operation`: `create`, `read`, `update`, `delete`, `import`
/// - `status`: `success`, `present`, `drifted`, `absent`, `error`
pub static LIFECYCLE_OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_lifecycle_operations_total"),
        "Total number of record lifecycle operations by operation and status",
    );
    let counter = CounterVec::new(opts, &["operation", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Drift Metrics
// ============================================================================

/// Total number of drifted fields realigned from the provider
///
/// Labels:
/// - `field`: record field name (e.g. `ttl`, `record_data`)
pub static DRIFT_DETECTED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_drift_detected_total"),
        "Total number of record fields realigned from the provider by field",
    );
    let counter = CounterVec::new(opts, &["field"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// API Metrics
// ============================================================================

/// Total number of provider API requests by method and status
///
/// Labels:
/// - `method`: HTTP method
/// - `status`: HTTP status code, or `error` when no response was received
pub static API_REQUESTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_api_requests_total"),
        "Total number of provider API requests by method and status",
    );
    let counter = CounterVec::new(opts, &["method", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of provider API requests in seconds
pub static API_REQUEST_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_api_request_duration_seconds"),
        "Duration of provider API requests in seconds by method",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["method"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record the outcome of a lifecycle operation.
pub fn record_lifecycle_operation(operation: &str, status: &str) {
    LIFECYCLE_OPERATIONS_TOTAL
        .with_label_values(&[operation, status])
        .inc();
}

/// Record one drifted field.
pub fn record_drift(field: &str) {
    DRIFT_DETECTED_TOTAL.with_label_values(&[field]).inc();
}

/// Record a provider API request.
pub fn record_api_request(method: &str, status: &str, duration: Duration) {
    API_REQUESTS_TOTAL.with_label_values(&[method, status]).inc();
    API_REQUEST_DURATION_SECONDS
        .with_label_values(&[method])
        .observe(duration.as_secs_f64());
}

/// Gather all metrics in Prometheus text format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    // Touch the lazies so every family is registered even before first use
    LazyLock::force(&LIFECYCLE_OPERATIONS_TOTAL);
    LazyLock::force(&DRIFT_DETECTED_TOTAL);
    LazyLock::force(&API_REQUESTS_TOTAL);
    LazyLock::force(&API_REQUEST_DURATION_SECONDS);

    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
