//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): API requests by method, status
//! - `gateway_request_duration_seconds` (histogram): handler latency
//! - `gateway_upstream_calls_total` (counter): backend calls by endpoint, status
//! - `gateway_upstream_duration_seconds` (histogram): backend latency by endpoint
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a completed client request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a backend call. `status` is `None` when the transport failed.
pub fn record_upstream(endpoint: &'static str, status: Option<u16>, start: Instant) {
    let status = status.map_or_else(|| "transport_error".to_string(), |s| s.to_string());
    counter!(
        "gateway_upstream_calls_total",
        "endpoint" => endpoint,
        "status" => status
    )
    .increment(1);
    histogram!("gateway_upstream_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}
