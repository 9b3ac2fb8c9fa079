//! Prometheus metrics for http-mock.
//!
//! Tracks catch-all outcomes, registrations and control endpoint usage.
use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, Counter, CounterVec, Encoder, TextEncoder,
};
use tracing::warn;

lazy_static! {
    /// Catch-all requests by outcome
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "http_mock_requests_total",
        "Total number of catch-all requests handled",
        &["outcome"]  // outcome: matched|no_match|exhausted|error
    )
    .unwrap();

    /// Successfully registered expectations
    pub static ref EXPECTATIONS_REGISTERED_TOTAL: Counter = register_counter!(
        "http_mock_expectations_registered_total",
        "Total number of expectations registered"
    )
    .unwrap();

    /// Control endpoint hits
    pub static ref CONTROL_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "http_mock_control_requests_total",
        "Total number of control endpoint requests",
        &["endpoint"]
    )
    .unwrap();
}

/// Collect and return all metrics in Prometheus text format
pub fn collect_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

pub fn record_outcome(outcome: &str) {
    REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_registration() {
    EXPECTATIONS_REGISTERED_TOTAL.inc();
}

pub fn record_control(endpoint: &str) {
    CONTROL_REQUESTS_TOTAL.with_label_values(&[endpoint]).inc();
}
