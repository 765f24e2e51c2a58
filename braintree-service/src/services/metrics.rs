use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> Result<(), BuildError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    if METRICS_HANDLE.set(handle).is_err() {
        tracing::warn!("Metrics recorder already initialized");
    }

    metrics::describe_counter!(
        "gateway_operations_total",
        "Gateway operations by operation and outcome"
    );
    Ok(())
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Count one facade operation.
///
/// Without an installed recorder this is a no-op.
pub fn record_operation(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "gateway_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
