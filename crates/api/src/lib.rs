// Path: crates/api/src/lib.rs

//! # hkv API Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! # hkv API
//!
//! Capability traits and small concrete collaborators for the history store.
//! This crate defines the stable contract between the store and its callers.

/// Token-qualified, multi-versioned key/value access.
pub mod history;
/// Namespaced byte-oriented key/value access and a debug in-memory store.
pub mod kv;
/// The registry of in-flight operations that bounds collection.
pub mod pending;
/// The ordered byte-sequence capability.
pub mod seq;

/// Re-exports the error types from `hkv-types`.
pub mod error {
    pub use hkv_types::error::{ByteSeqError, ErrorCode, HistoryError, TokenError};
}

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::error::{ErrorCode, HistoryError};
    pub use crate::history::{AtToken, BatchEntry, HistoryKv, SweepStats};
    pub use crate::kv::{Kv, MemoryKv, StateKey, StateVal};
    pub use crate::pending::{Horizon, PendingGuard, PendingOperations, PendingRegistry, TokenClock};
    pub use crate::seq::ByteSeq;
    pub use hkv_types::Token;
}
