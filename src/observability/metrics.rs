//! Metrics collection and exposition.
//!
//! # Metrics
//! - `subscription_requests_total` (counter): pipeline runs by outcome
//! - `subscription_pipeline_duration_seconds` (histogram): end-to-end latency
//! - `subscription_fetch_total` (counter): upstream fetches by result

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished pipeline run.
pub fn record_pipeline(outcome: &'static str, start: Instant) {
    ::metrics::counter!("subscription_requests_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("subscription_pipeline_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

/// Record one upstream fetch.
pub fn record_fetch(result: &'static str) {
    ::metrics::counter!("subscription_fetch_total", "result" => result).increment(1);
}
