//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_submissions_total` (counter): submission attempts by result
//! - `relay_submit_retries_total` (counter): waits before a resubmission
//! - `relay_polls_total` (counter): outcome queries by status
//! - `relay_outcomes_total` (counter): finished confirmations by outcome
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_submission(accepted: bool) {
    let result = if accepted { "accepted" } else { "rejected" };
    counter!("relay_submissions_total", "result" => result).increment(1);
}

pub fn record_submit_retry() {
    counter!("relay_submit_retries_total").increment(1);
}

pub fn record_poll(status: &'static str) {
    counter!("relay_polls_total", "status" => status).increment(1);
}

pub fn record_outcome(outcome: &'static str) {
    counter!("relay_outcomes_total", "outcome" => outcome).increment(1);
}
