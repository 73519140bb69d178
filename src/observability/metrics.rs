//! Metrics collection and exposition.
//!
//! # Metrics
//! - `inbound_listener_bound` (gauge): 1 while a kind's slot holds a handle
//! - `inbound_reconfigure_total` (counter): reconfigure outcomes by kind
//!   (`unchanged`, `bound`, `disabled`, `failed`)
//!
//! Without an installed recorder these calls are no-ops.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::inbound::FrontEndKind;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_listener_bound(kind: FrontEndKind, bound: bool) {
    gauge!("inbound_listener_bound", "kind" => kind.as_str()).set(if bound { 1.0 } else { 0.0 });
}

pub fn record_reconfigure(kind: FrontEndKind, outcome: &'static str) {
    counter!("inbound_reconfigure_total", "kind" => kind.as_str(), "outcome" => outcome)
        .increment(1);
}
