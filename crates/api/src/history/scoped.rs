// Path: crates/api/src/history/scoped.rs

//! Adapts a `HistoryKv` pinned to one token into a plain `Kv`.

use super::HistoryKv;
use crate::kv::{Kv, StateVal};
use hkv_types::error::HistoryError;
use hkv_types::Token;

/// A [`HistoryKv`] bound to a single token.
///
/// Reads are floor reads at the token, writes are single-key batches at the
/// token and deletes record tombstones. Drilling drills the underlying store
/// and keeps the token.
#[derive(Debug, Clone)]
pub struct AtToken<H> {
    store: H,
    token: Token,
}

impl<H: HistoryKv> AtToken<H> {
    /// Binds `store` to `token`.
    pub fn new(store: H, token: Token) -> Self {
        Self { store, token }
    }

    /// The token this view reads and writes at.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Returns the wrapped store.
    pub fn into_inner(self) -> H {
        self.store
    }
}

impl<H: HistoryKv> Kv for AtToken<H> {
    type Drilled = AtToken<H::Drilled>;

    fn read(&self, key: &[u8]) -> Result<Option<StateVal>, HistoryError> {
        self.store.read_at(key, &self.token)
    }

    fn write(&self, key: &[u8], value: &[u8]) -> Result<(), HistoryError> {
        self.store.write_at(key, value, &self.token)
    }

    fn delete(&self, key: &[u8]) -> Result<(), HistoryError> {
        self.store.delete_at(key, &self.token)
    }

    fn drill(&self, subkey: &[u8]) -> Self::Drilled {
        AtToken::new(self.store.drill(subkey), self.token.clone())
    }

    fn prefix(&self) -> &[u8] {
        self.store.prefix()
    }
}
