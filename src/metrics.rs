//! Run metrics, recorded through the `metrics` facade.
//!
//! Without an installed recorder every call below is a no-op. When a snapshot
//! path is configured, [`init_metrics`] installs a Prometheus recorder (no HTTP
//! listener) and [`write_snapshot`] renders it to that file at the end of a run.

use crate::error::Result;
use crate::transform::TransformStats;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the in-process recorder. Idempotent.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = HANDLE.set(handle);
            info!("Prometheus recorder installed");
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

pub fn write_snapshot(path: &Path) -> Result<bool> {
    let Some(handle) = HANDLE.get() else {
        return Ok(false);
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, handle.render())?;
    info!("📈 Wrote metrics snapshot to {}", path.display());
    Ok(true)
}

pub fn record_stage_duration(stage: &'static str, secs: f64) {
    ::metrics::histogram!("retail_stage_duration_seconds", "stage" => stage).record(secs);
}

pub fn record_fetch(bytes: u64) {
    ::metrics::counter!("retail_source_bytes_total").increment(bytes);
}

pub fn record_transform(stats: &TransformStats) {
    ::metrics::counter!("retail_rows_loaded_total").increment(stats.loaded as u64);
    ::metrics::counter!("retail_rows_dropped_total", "reason" => "invoice")
        .increment(stats.dropped_invoice as u64);
    ::metrics::counter!("retail_rows_dropped_total", "reason" => "customer")
        .increment(stats.dropped_customer as u64);
    ::metrics::counter!("retail_rows_dropped_total", "reason" => "quantity")
        .increment(stats.dropped_quantity as u64);
    ::metrics::counter!("retail_transactions_written_total").increment(stats.emitted as u64);
}

pub fn record_customers(count: usize) {
    ::metrics::counter!("retail_customers_written_total").increment(count as u64);
}

pub fn record_compressed(count: usize) {
    ::metrics::counter!("retail_artifacts_compressed_total").increment(count as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_skipped_without_a_recorder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.prom");
        assert!(!write_snapshot(&path).unwrap());
        assert!(!path.exists());
    }
}
