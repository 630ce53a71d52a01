//! Prometheus metrics for contact-service.
//!
//! HTTP request metrics come from `service_core::middleware::metrics`; this
//! module owns the recorder and the domain counters.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Later calls are ignored.
pub fn init_metrics() -> Result<(), anyhow::Error> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Render metrics in Prometheus text format; empty before [`init_metrics`].
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Count one contact submission by outcome (`accepted`, `persist_failed`).
pub fn record_contact_submission(outcome: &'static str) {
    counter!("contact_submissions_total", "outcome" => outcome).increment(1);
}

/// Count one status check write.
pub fn record_status_check() {
    counter!("status_checks_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_empty_without_recorder() {
        // The recorder is never installed in unit tests.
        assert!(get_metrics().is_empty());
    }
}
