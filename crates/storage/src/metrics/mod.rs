// Path: crates/storage/src/metrics/mod.rs
use hkv_telemetry::sinks::HistoryMetricsSink;

/// The process-wide history metrics sink, or a no-op if none is installed.
pub(crate) fn metrics() -> &'static dyn HistoryMetricsSink {
    hkv_telemetry::history_metrics()
}
