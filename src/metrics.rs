//! Metrics initialization for Prometheus exporter.

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::MetricsConfig;
use crate::error::{Error, Result};

/// Counter of per-source cycle outcomes, labelled by `outcome`.
pub const SOURCE_UPDATES_TOTAL: &str = "hostsync_source_updates_total";

/// Initialize the metrics system based on configuration.
///
/// When metrics are enabled, this starts an HTTP server that exposes
/// a `/metrics` endpoint for Prometheus to scrape. Must be called from
/// within a Tokio runtime.
///
/// When metrics are disabled, this is a no-op. The `metrics` crate
/// handles unregistered metrics gracefully (they become no-ops).
pub fn init(config: &MetricsConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(config.listen)
        .install()
        .map_err(|err| Error::Metrics(err.to_string()))?;

    Ok(())
}

/// Count one source outcome.
pub(crate) fn record_outcome(outcome: &'static str) {
    metrics::counter!(SOURCE_UPDATES_TOTAL, "outcome" => outcome).increment(1);
}
