//! Metrics for management API traffic and user actions.
//!
//! This module provides:
//! - Request latency per endpoint
//! - Request and failure counters per endpoint
//! - Counters for route mutations issued from the panel

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Management API request latency metric name.
pub const METRIC_API_REQUEST_LATENCY: &str = "api_request_latency_ms";
/// Management API requests counter metric name.
pub const METRIC_API_REQUESTS: &str = "api_requests_total";
/// Management API failures counter metric name.
pub const METRIC_API_FAILURES: &str = "api_failures_total";
/// Route mutations counter metric name.
pub const METRIC_ROUTE_MUTATIONS: &str = "route_mutations_total";
/// Route list reloads counter metric name.
pub const METRIC_LIST_RELOADS: &str = "route_list_reloads_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_API_REQUEST_LATENCY,
        "Management API request latency in milliseconds"
    );
    describe_counter!(
        METRIC_API_REQUESTS,
        "Total number of management API requests"
    );
    describe_counter!(
        METRIC_API_FAILURES,
        "Total number of failed management API requests"
    );
    describe_counter!(
        METRIC_ROUTE_MUTATIONS,
        "Total number of successful route create/update/toggle/delete operations"
    );
    describe_counter!(
        METRIC_LIST_RELOADS,
        "Total number of route list reloads"
    );

    debug!("Metrics initialized");
}

/// Increment request counter.
pub fn inc_api_requests(endpoint: &'static str) {
    counter!(METRIC_API_REQUESTS, "endpoint" => endpoint).increment(1);
}

/// Increment failure counter. `kind` is `transport`, `status` or `decode`.
pub fn inc_api_failures(endpoint: &'static str, kind: &'static str) {
    counter!(METRIC_API_FAILURES, "endpoint" => endpoint, "kind" => kind).increment(1);
}

/// Increment route mutation counter.
pub fn inc_route_mutations(operation: &'static str) {
    counter!(METRIC_ROUTE_MUTATIONS, "operation" => operation).increment(1);
}

/// Increment list reload counter.
pub fn inc_list_reloads() {
    counter!(METRIC_LIST_RELOADS).increment(1);
}

/// RAII guard for timing API requests.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    endpoint: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given endpoint.
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            start: Instant::now(),
            endpoint,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(METRIC_API_REQUEST_LATENCY, "endpoint" => self.endpoint)
            .record(self.elapsed_ms());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn latency_timer_measures_time() {
        let timer = LatencyTimer::new("health");
        sleep(Duration::from_millis(10));
        let elapsed = timer.elapsed_ms();
        assert!(elapsed >= 9.0); // Allow some tolerance
    }
}
