// Path: crates/telemetry/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # hkv Telemetry
//!
//! Observability infrastructure for the history store: structured logging
//! initialization, abstract metrics sinks that decouple instrumentation from
//! any backend, and a scope timer.

/// The initialization routine for global structured logging.
pub mod init;
/// Abstract traits (`*MetricsSink`) that define the contract for metrics reporting.
pub mod sinks;
/// The sweep duration timer.
pub mod time;

// Re-export the public helper function for easy access to the global sink.
pub use sinks::history_metrics;
