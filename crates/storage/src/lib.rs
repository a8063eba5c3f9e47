// Path: crates/storage/src/lib.rs
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

//! An in-memory history cache for the hkv workspace.
//!
//! `MemHistoryStore` keeps a token-ordered version list per key, trims it
//! under recency-buffer pressure and runs a background collector that removes
//! whole keys once no pending operation can observe them. It is meant to sit
//! in front of a durable store; nothing here is persisted.

mod buffer;
mod collector;
pub mod memory_history_store;
mod metrics;
mod versions;

pub use memory_history_store::{HistoryView, MemHistoryStore};
