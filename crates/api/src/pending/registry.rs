// Path: crates/api/src/pending/registry.rs

//! A reference-counted, ordered registry of pending operation tokens.

use super::PendingRegistry;
use hkv_types::Token;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// The tokens of all in-flight operations, each with a holder count.
///
/// Several operations may register the same token. A token leaves the
/// registry only when its last holder deregisters.
#[derive(Debug, Default)]
pub struct PendingOperations {
    inner: RwLock<BTreeMap<Token, usize>>,
}

impl PendingOperations {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more holder of `token`.
    pub fn register(&self, token: Token) {
        let mut map = self.inner.write();
        let count = map.entry(token).or_insert(0);
        *count += 1;
        log::trace!(target: "pending", "Registered pending token (holders: {})", *count);
    }

    /// Releases one holder of `token`. Returns false if `token` was not registered.
    pub fn deregister(&self, token: &Token) -> bool {
        let mut map = self.inner.write();
        let Some(count) = map.get_mut(token) else {
            log::warn!(target: "pending", "Deregistered unknown pending token {}", token);
            return false;
        };
        *count = count.saturating_sub(1);
        if *count == 0 {
            map.remove(token);
            log::debug!(target: "pending", "Pending token {} released (remaining: {})", token, map.len());
        }
        true
    }

    /// Registers `token` and returns a guard that deregisters it on drop.
    ///
    /// Takes `&Arc<Self>` so the guard keeps the registry alive.
    pub fn guard(self: &Arc<Self>, token: Token) -> PendingGuard {
        self.register(token.clone());
        PendingGuard {
            registry: Arc::clone(self),
            token,
        }
    }

    /// Returns a snapshot of all registered tokens.
    pub fn snapshot(&self) -> BTreeSet<Token> {
        self.inner.read().keys().cloned().collect()
    }

    /// The number of distinct registered tokens.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns true if no operation is pending.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl PendingRegistry for PendingOperations {
    fn oldest(&self) -> Option<Token> {
        self.inner.read().keys().next().cloned()
    }
}

/// An RAII registration of one pending operation.
#[must_use = "PendingGuard must be bound to a variable to keep the token registered"]
#[derive(Debug)]
pub struct PendingGuard {
    registry: Arc<PendingOperations>,
    token: Token,
}

impl PendingGuard {
    /// The token this guard holds.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Moves the registration to `token`, releasing the previous one.
    ///
    /// The new token is registered before the old one is released, so the
    /// horizon never jumps past either of them in between.
    pub fn advance(&mut self, token: Token) {
        self.registry.register(token.clone());
        let previous = std::mem::replace(&mut self.token, token);
        self.registry.deregister(&previous);
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.registry.deregister(&self.token);
    }
}
