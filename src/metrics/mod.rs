//! Prometheus metrics for symbscan
//!
//! Recorded by each polling worker, labelled by controller address:
//! - Scan counts and latency histograms
//! - Write counts, dropped writes and pending queue depth
//! - Device connection and data validity gauges
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;
use tracing::info;

/// Initialize Prometheus metrics exporter
/// Returns a handle to render metrics
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    info!("Prometheus metrics initialized");
    Ok(handle)
}

/// Timing for one full scan of a controller
pub struct ScanMetrics {
    start: Instant,
    device: String,
}

impl ScanMetrics {
    /// Start timing a scan
    pub fn start(device: &str) -> Self {
        Self {
            start: Instant::now(),
            device: device.to_string(),
        }
    }

    /// Record the scan result; `status` is `success`, `comm` or `read`
    pub fn finish(self, status: &'static str) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            "symbscan_scans_total",
            "device" => self.device.clone(),
            "status" => status
        )
        .increment(1);

        histogram!(
            "symbscan_scan_duration_seconds",
            "device" => self.device
        )
        .record(duration);
    }
}

/// Record one write attempt
pub fn record_write(device: &str, kind: &'static str, success: bool) {
    counter!(
        "symbscan_writes_total",
        "device" => device.to_string(),
        "kind" => kind,
        "status" => if success { "success" } else { "error" }
    )
    .increment(1);
}

/// Record a write the worker gave up on
pub fn record_write_dropped(device: &str, reason: &'static str) {
    counter!(
        "symbscan_writes_dropped_total",
        "device" => device.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// Record pending write queue depth
pub fn record_pending_writes(device: &str, count: usize) {
    gauge!(
        "symbscan_pending_writes",
        "device" => device.to_string()
    )
    .set(count as f64);
}

/// Record device connection status
pub fn record_device_status(device: &str, connected: bool) {
    gauge!(
        "symbscan_device_connected",
        "device" => device.to_string()
    )
    .set(if connected { 1.0 } else { 0.0 });
}

/// Record whether the mirror holds fresh data
pub fn record_data_valid(device: &str, valid: bool) {
    gauge!(
        "symbscan_data_valid",
        "device" => device.to_string()
    )
    .set(if valid { 1.0 } else { 0.0 });
}
