//! Metrics collection and exposition.
//!
//! # Metrics
//! - `log_records_dropped_total` (counter): events vetoed by the rate limiter, by level
//! - `http_requests_total` (counter): requests seen by the context middleware
//! - `http_request_duration_seconds` (histogram): request latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::Level;

use crate::observability::LoggingError;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), LoggingError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_log_dropped(level: &Level) {
    ::metrics::counter!("log_records_dropped_total", "level" => level.as_str()).increment(1);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("http_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}
