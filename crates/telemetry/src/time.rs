// Path: crates/telemetry/src/time.rs
use crate::sinks::HistoryMetricsSink;
use std::time::{Duration, Instant};

/// Measures one collection sweep and reports it when dropped.
///
/// Hold it for the whole sweep, including the time spent waiting on the
/// buffer lock, so contention with writers shows up in the histogram.
pub struct SweepTimer<'a> {
    sink: &'a dyn HistoryMetricsSink,
    /// When the sweep was requested.
    started: Instant,
}

impl<'a> SweepTimer<'a> {
    /// Starts timing a sweep reported to `sink`.
    pub fn start(sink: &'a dyn HistoryMetricsSink) -> Self {
        Self {
            sink,
            started: Instant::now(),
        }
    }

    /// Time spent in the sweep so far.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for SweepTimer<'_> {
    fn drop(&mut self) {
        self.sink.observe_sweep_duration(self.elapsed().as_secs_f64());
    }
}
