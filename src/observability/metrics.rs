//! Metrics collection and exposition.
//!
//! # Metrics
//! - `devproxy_requests_total` (counter): requests by action, status
//! - `devproxy_request_duration_seconds` (histogram): latency by action
//! - `devproxy_gateway_errors_total` (counter): forward failures by kind
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(action: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(
        "devproxy_requests_total",
        "action" => action,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("devproxy_request_duration_seconds", "action" => action)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_gateway_error(kind: &'static str) {
    ::metrics::counter!("devproxy_gateway_errors_total", "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_taken_metrics_address_is_an_error() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();

        assert!(init_metrics(addr).is_err());
    }
}
