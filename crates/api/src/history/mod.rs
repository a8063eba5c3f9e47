// Path: crates/api/src/history/mod.rs
//! Defines the `HistoryKv` trait: token-qualified, multi-versioned key/value access.
//!
//! A history store keeps, per key, an ascending list of `(token, value)`
//! versions. A read at token `T` returns the version with the greatest token
//! not above `T` (a floor read). A `None` value in a write batch records a
//! tombstone: the key reads as absent from that token on.

use crate::kv::StateVal;
use crate::seq::ByteSeq;
use hkv_types::error::HistoryError;
use hkv_types::Token;
use std::sync::Arc;

mod scoped;

pub use scoped::AtToken;

/// One entry of a write batch: a relative key and its value, or `None` for a
/// tombstone.
pub type BatchEntry = (Vec<u8>, Option<Vec<u8>>);

/// Counters reported by one collection sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    /// The number of keys examined.
    pub keys_scanned: usize,
    /// The number of keys whose whole history was removed.
    pub keys_collected: usize,
    /// True if the sweep was skipped because no horizon could be computed.
    pub skipped: bool,
}

/// A namespaced, multi-versioned key/value store.
pub trait HistoryKv: Send + Sync {
    /// The type returned by [`drill`](HistoryKv::drill).
    type Drilled: HistoryKv;

    /// Floor read: the value of `key` as of `token`.
    ///
    /// Returns `Ok(None)` for a key that was never written or whose visible
    /// version is a tombstone. Fails with [`HistoryError::ExpiredRead`] if
    /// the oldest version still retained for `key` is newer than `token`.
    fn read_at(&self, key: &[u8], token: &Token) -> Result<Option<StateVal>, HistoryError>;

    /// Appends one version per entry of `batch`, all stamped with `token`.
    ///
    /// Tokens must be submitted in increasing order per key. Each key is
    /// appended independently; the batch is not atomic across keys.
    fn write_batch(&self, batch: &[BatchEntry], token: &Token) -> Result<(), HistoryError>;

    /// Returns a child view whose keys live below `subkey`.
    fn drill(&self, subkey: &[u8]) -> Self::Drilled;

    /// The namespace prefix applied to every key of this view.
    fn prefix(&self) -> &[u8];

    /// Stops any background work owned by the store. Idempotent.
    fn shutdown(&self);

    /// Writes a single value at `token`.
    fn write_at(&self, key: &[u8], value: &[u8], token: &Token) -> Result<(), HistoryError> {
        self.write_batch(&[(key.to_vec(), Some(value.to_vec()))], token)
    }

    /// Records a tombstone for `key` at `token`.
    fn delete_at(&self, key: &[u8], token: &Token) -> Result<(), HistoryError> {
        self.write_batch(&[(key.to_vec(), None)], token)
    }

    /// Floor read keyed by any byte-sequence representation.
    ///
    /// The key must support copying; a representation that cannot be copied
    /// fails with [`HistoryError::Unsupported`].
    fn read_seq_at(&self, key: &dyn ByteSeq, token: &Token) -> Result<Option<StateVal>, HistoryError> {
        let owned = key.try_copy()?;
        self.read_at(&owned, token)
    }

    /// Binds this store to a single token, yielding a plain [`Kv`](crate::kv::Kv).
    fn at(&self, token: Token) -> AtToken<&Self>
    where
        Self: Sized,
    {
        AtToken::new(self, token)
    }
}

impl<T: HistoryKv + ?Sized> HistoryKv for &T {
    type Drilled = T::Drilled;

    fn read_at(&self, key: &[u8], token: &Token) -> Result<Option<StateVal>, HistoryError> {
        (**self).read_at(key, token)
    }

    fn write_batch(&self, batch: &[BatchEntry], token: &Token) -> Result<(), HistoryError> {
        (**self).write_batch(batch, token)
    }

    fn drill(&self, subkey: &[u8]) -> Self::Drilled {
        (**self).drill(subkey)
    }

    fn prefix(&self) -> &[u8] {
        (**self).prefix()
    }

    fn shutdown(&self) {
        (**self).shutdown()
    }
}

impl<T: HistoryKv + ?Sized> HistoryKv for Arc<T> {
    type Drilled = T::Drilled;

    fn read_at(&self, key: &[u8], token: &Token) -> Result<Option<StateVal>, HistoryError> {
        (**self).read_at(key, token)
    }

    fn write_batch(&self, batch: &[BatchEntry], token: &Token) -> Result<(), HistoryError> {
        (**self).write_batch(batch, token)
    }

    fn drill(&self, subkey: &[u8]) -> Self::Drilled {
        (**self).drill(subkey)
    }

    fn prefix(&self) -> &[u8] {
        (**self).prefix()
    }

    fn shutdown(&self) {
        (**self).shutdown()
    }
}
