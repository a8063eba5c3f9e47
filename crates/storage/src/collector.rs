// Path: crates/storage/src/collector.rs

//! The background collector thread and its explicit lifecycle.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// A dedicated thread that calls `tick` every `interval` until stopped.
///
/// The sleep between ticks is a channel receive with a timeout, so a stop
/// request wakes the thread immediately instead of waiting out the interval.
#[derive(Debug)]
pub(crate) struct Collector {
    stop_tx: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl Collector {
    /// Spawns the collector. `tick` returns false to end the loop on its own.
    pub(crate) fn spawn<F>(interval: Duration, mut tick: F) -> io::Result<Self>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("history-gc".to_string())
            .spawn(move || {
                tracing::debug!(target: "history::gc", interval_ms = interval.as_millis() as u64, "Collector started");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    if !tick() {
                        break;
                    }
                }
                tracing::debug!(target: "history::gc", "Collector exiting");
            })?;
        Ok(Self { stop_tx, handle })
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signals the thread and waits for it to exit.
    pub(crate) fn stop(self) {
        // A send error only means the thread has already exited.
        let _ = self.stop_tx.send(());
        if self.handle.join().is_err() {
            tracing::error!(target: "history::gc", "Collector thread panicked");
        }
    }
}
