//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define collector metrics (requests, identities, dispatch outcomes)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `collector_requests_total` (counter): requests by method, status
//! - `collector_request_duration_seconds` (histogram): handler latency
//! - `collector_identifiers_total` (counter): identities by kind, assigned/renewed
//! - `collector_events_enqueued_total` (counter): events accepted by the pool
//! - `collector_events_dropped_total` (counter): events shed under pool pressure
//! - `collector_dispatch_faults_total` (counter): enqueue failures
//! - `collector_events_processed_total` (counter): events handled by workers
//! - `collector_events_failed_total` (counter): events whose processor panicked
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op, so tests need no setup
//! - Histogram buckets tuned for sub-millisecond handler latencies

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};

const LATENCY_BUCKETS: &[f64] = &[
    0.000_05, 0.000_1, 0.000_25, 0.000_5, 0.001, 0.002_5, 0.005, 0.01, 0.05, 0.1,
];

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full("collector_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install()?;

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "collector_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("collector_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_identifier(kind: &'static str, outcome: &'static str) {
    ::metrics::counter!("collector_identifiers_total", "kind" => kind, "outcome" => outcome)
        .increment(1);
}

pub fn record_event_enqueued() {
    ::metrics::counter!("collector_events_enqueued_total").increment(1);
}

pub fn record_event_dropped(reason: &'static str) {
    ::metrics::counter!("collector_events_dropped_total", "reason" => reason).increment(1);
}

pub fn record_dispatch_fault(reason: &'static str) {
    ::metrics::counter!("collector_dispatch_faults_total", "reason" => reason).increment(1);
}

pub fn record_event_processed() {
    ::metrics::counter!("collector_events_processed_total").increment(1);
}

pub fn record_event_failed() {
    ::metrics::counter!("collector_events_failed_total").increment(1);
}
