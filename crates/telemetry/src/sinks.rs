// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized static reference to the global `HistoryMetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn HistoryMetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns a static reference to the configured history metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn history_metrics() -> &'static dyn HistoryMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

// --- Trait Definitions ---

/// A sink for metrics related to the in-memory history store.
pub trait HistoryMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the number of versions appended by writers.
    fn inc_versions_appended(&self, count: u64);
    /// Increments the number of single versions trimmed under buffer pressure.
    fn inc_versions_trimmed(&self, count: u64);
    /// Increments the number of keys removed wholesale by trimming or sweeps.
    fn inc_keys_collected(&self, count: u64);
    /// Increments the number of reads rejected because their version was collected.
    fn inc_expired_reads(&self);
    /// Sets the gauge for the current recency-buffer length.
    fn set_buffer_len(&self, len: u64);
    /// Observes the duration of a single collector sweep.
    fn observe_sweep_duration(&self, duration_secs: f64);
}

impl HistoryMetricsSink for NopSink {
    fn inc_versions_appended(&self, _count: u64) {}
    fn inc_versions_trimmed(&self, _count: u64) {}
    fn inc_keys_collected(&self, _count: u64) {}
    fn inc_expired_reads(&self) {}
    fn set_buffer_len(&self, _len: u64) {}
    fn observe_sweep_duration(&self, _duration_secs: f64) {}
}
