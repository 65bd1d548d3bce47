//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cad_relay_requests_total` (counter): HTTP submissions by method, status, kind
//! - `cad_relay_request_duration_seconds` (histogram): end-to-end latency
//! - `cad_relay_jobs_enqueued_total` (counter): jobs accepted into the queue
//! - `cad_relay_jobs_total` (counter): settled jobs by kind and outcome
//! - `cad_relay_queue_depth` (gauge): jobs waiting or running
//! - `cad_relay_queue_wait_seconds` (histogram): time from submit to start
//! - `cad_relay_execution_seconds` (histogram): executor call duration
//! - `cad_relay_rate_limited_total` (counter): submissions refused at admission

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled HTTP submission.
pub fn record_request(method: &str, status: u16, kind: &str, start: Instant) {
    counter!(
        "cad_relay_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
    histogram!("cad_relay_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a job entering the queue.
pub fn record_job_enqueued(kind: &'static str) {
    counter!("cad_relay_jobs_enqueued_total", "kind" => kind).increment(1);
    gauge!("cad_relay_queue_depth").increment(1.0);
}

/// Record a job settling, successfully or not.
pub fn record_job_settled(
    kind: &'static str,
    outcome: &'static str,
    queue_wait: Duration,
    execution: Duration,
) {
    counter!("cad_relay_jobs_total", "kind" => kind, "outcome" => outcome).increment(1);
    gauge!("cad_relay_queue_depth").decrement(1.0);
    histogram!("cad_relay_queue_wait_seconds").record(queue_wait.as_secs_f64());
    histogram!("cad_relay_execution_seconds").record(execution.as_secs_f64());
}

/// Record an admission rejection.
pub fn record_rate_limited() {
    counter!("cad_relay_rate_limited_total").increment(1);
}
