//! Prometheus recorder plus the counters this service emits.

use std::sync::OnceLock;
use std::time::Duration;

use axum::http::StatusCode;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global recorder once. A disabled exporter leaves the
/// `metrics` macros as no-ops.
pub(crate) fn init(enabled: bool) -> anyhow::Result<()> {
    if !enabled || RECORDER.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = RECORDER.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    RECORDER.get().map(PrometheusHandle::render)
}

pub(crate) fn record_http_response(status: StatusCode, latency: Duration) {
    let status = status.as_u16().to_string();
    metrics::counter!("http_requests_total", "status" => status.clone()).increment(1);
    metrics::histogram!("http_request_duration_seconds", "status" => status)
        .record(latency.as_secs_f64());
}

pub(crate) fn record_recomputation(aggregate: &'static str) {
    metrics::counter!("aggregate_recomputations_total", "aggregate" => aggregate).increment(1);
}

pub(crate) fn record_drift(aggregate: &'static str) {
    metrics::counter!("aggregate_drift_detected_total", "aggregate" => aggregate).increment(1);
}
