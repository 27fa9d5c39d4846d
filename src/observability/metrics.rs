//! Metrics catalog and Prometheus wiring for the analyzer.
//!
//! All metric names live in one enum so call sites never carry magic
//! strings and the whole catalog is visible in one place.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

/// Every metric the analyzer records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Loader
    LoaderRowsRead,
    LoaderRowsKept,
    LoaderRowsDropped,
    LoaderSchemaErrors,

    // Analyze boundary
    AnalyzeRuns,
    AnalyzeErrors,
    AnalyzeDuration,

    // Chart renderer
    ChartRenders,
    ChartRenderErrors,
    ChartPngBytes,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::LoaderRowsRead => "hospital_loader_rows_read_total",
            MetricName::LoaderRowsKept => "hospital_loader_rows_kept_total",
            MetricName::LoaderRowsDropped => "hospital_loader_rows_dropped_total",
            MetricName::LoaderSchemaErrors => "hospital_loader_schema_errors_total",

            MetricName::AnalyzeRuns => "hospital_analyze_runs_total",
            MetricName::AnalyzeErrors => "hospital_analyze_errors_total",
            MetricName::AnalyzeDuration => "hospital_analyze_duration_seconds",

            MetricName::ChartRenders => "hospital_chart_renders_total",
            MetricName::ChartRenderErrors => "hospital_chart_render_errors_total",
            MetricName::ChartPngBytes => "hospital_chart_png_bytes",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the Prometheus recorder. Idempotent; the handle is kept for
/// in-process rendering at `GET /metrics`.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Metrics recorder handle was already set");
            }
            info!("Prometheus recorder installed (handle available for in-process render)");
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    });
}

/// Renders current metrics in Prometheus text format, if a recorder is
/// installed.
pub fn render_metrics() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

pub fn record_rows(read: usize, kept: usize, dropped: usize) {
    counter!(MetricName::LoaderRowsRead.as_str()).increment(read as u64);
    counter!(MetricName::LoaderRowsKept.as_str()).increment(kept as u64);
    counter!(MetricName::LoaderRowsDropped.as_str()).increment(dropped as u64);
}

pub fn record_schema_error() {
    counter!(MetricName::LoaderSchemaErrors.as_str()).increment(1);
}

pub fn record_analyze_run() {
    counter!(MetricName::AnalyzeRuns.as_str()).increment(1);
}

pub fn record_analyze_error() {
    counter!(MetricName::AnalyzeErrors.as_str()).increment(1);
}

pub fn record_analyze_duration(seconds: f64) {
    histogram!(MetricName::AnalyzeDuration.as_str()).record(seconds);
}

pub fn record_chart_rendered(png_bytes: usize) {
    counter!(MetricName::ChartRenders.as_str()).increment(1);
    histogram!(MetricName::ChartPngBytes.as_str()).record(png_bytes as f64);
}

pub fn record_chart_error() {
    counter!(MetricName::ChartRenderErrors.as_str()).increment(1);
}
