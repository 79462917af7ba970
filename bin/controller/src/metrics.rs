//! Prometheus metrics for the controller.
//!
//! All metrics are aggregated in the [`Metrics`] struct.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use snapshot::Role;
use std::time::Duration;

/// Aggregated metrics for the controller.
///
/// Metric descriptions are registered with the global registry on creation.
/// Without an installed recorder every call is a no-op.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        // Snapshot metrics
        describe_counter!(
            "controller_refreshes_total",
            "Total number of snapshot refreshes"
        );
        describe_histogram!(
            "controller_refresh_duration_seconds",
            "Duration of each snapshot refresh in seconds"
        );
        describe_counter!(
            "controller_read_failures_total",
            "Snapshot reads that failed after retries, by field"
        );

        // Dispatch metrics
        describe_counter!(
            "controller_dispatch_total",
            "Submitted transactions by action and outcome"
        );
        describe_counter!(
            "controller_dispatch_rejected_total",
            "Dispatches rejected before submission, by action and reason"
        );

        // Session metrics
        describe_gauge!(
            "controller_role",
            "Role of the active account (0 none, 1 whitelisted, 2 admin, 3 owner)"
        );
        describe_gauge!(
            "controller_connected",
            "Whether a wallet account is active"
        );
    }

    /// Record a completed refresh.
    pub fn record_refresh(&self, duration: Duration, failed_fields: &[client::ReadField]) {
        counter!("controller_refreshes_total").increment(1);
        histogram!("controller_refresh_duration_seconds").record(duration.as_secs_f64());

        for field in failed_fields {
            counter!("controller_read_failures_total", "field" => field.as_str()).increment(1);
        }
    }

    /// Record a submitted transaction.
    pub fn record_dispatch(&self, action: &str, success: bool) {
        let outcome = if success { "succeeded" } else { "failed" };
        counter!("controller_dispatch_total", "action" => action.to_string(), "outcome" => outcome)
            .increment(1);
    }

    /// Record a dispatch rejected by validation or the busy rule.
    pub fn record_rejection(&self, action: &str, reason: &'static str) {
        counter!(
            "controller_dispatch_rejected_total",
            "action" => action.to_string(),
            "reason" => reason
        )
        .increment(1);
    }

    pub fn set_role(&self, role: Role) {
        gauge!("controller_role").set(role as u8 as f64);
    }

    pub fn set_connected(&self, connected: bool) {
        gauge!("controller_connected").set(if connected { 1.0 } else { 0.0 });
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
