// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
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

//! # hkv Types
//!
//! The foundational crate of the workspace, containing the logical clock
//! (`Token`), every error enum, and the store configuration.
//!
//! ## Architectural Role
//!
//! As the base crate, `hkv-types` has minimal dependencies and is itself a
//! dependency for every other crate in the workspace. This keeps the
//! canonical definitions of `Token`, `HistoryError` and `HistoryConfig` in one
//! place and prevents circular dependencies.

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::HistoryError> = std::result::Result<T, E>;

/// Configuration structures for the history store.
pub mod config;
/// A unified set of all error types used across the workspace.
pub mod error;
/// The hierarchical, totally ordered logical clock.
pub mod token;

pub use token::Token;
