//! Prometheus request metrics, compiled with the `metrics` feature.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};

const NAMESPACE: &str = "postcards";
const ENDPOINT: &str = "/metrics";

/// Request-count and latency middleware that also serves `/metrics`.
/// Probe traffic is left out of the histograms.
///
/// # Errors
/// Fails when the collectors cannot be registered.
pub(crate) fn request_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new(NAMESPACE)
        .endpoint(ENDPOINT)
        .exclude("/health/ready")
        .exclude("/health/live")
        .build()
        .map_err(|err| std::io::Error::other(format!("metrics registration failed: {err}")))
}
