// Path: crates/api/src/kv/mod.rs
//! Defines the `Kv` trait for namespaced, byte-oriented key/value access.

use hkv_types::error::HistoryError;
use std::sync::Arc;

mod memory;

pub use memory::MemoryKv;

/// A fully qualified key as stored in a backing map.
pub type StateKey = Arc<[u8]>;
/// A stored value. Shared so that reads never copy.
pub type StateVal = Arc<[u8]>;

/// A namespace-scoped view over a byte-oriented key/value store.
///
/// Every key passed to a `Kv` is relative to its [`prefix`](Kv::prefix).
/// Implementations prepend the prefix before touching the backing store, so a
/// drilled child and its parent share the same data.
pub trait Kv: Send + Sync {
    /// The type returned by [`drill`](Kv::drill).
    type Drilled: Kv;

    /// Gets the value stored under `key`, or `None` if there is none.
    fn read(&self, key: &[u8]) -> Result<Option<StateVal>, HistoryError>;

    /// Stores `value` under `key`.
    fn write(&self, key: &[u8], value: &[u8]) -> Result<(), HistoryError>;

    /// Removes any value stored under `key`.
    fn delete(&self, key: &[u8]) -> Result<(), HistoryError>;

    /// Returns a child view whose keys live below `subkey`.
    fn drill(&self, subkey: &[u8]) -> Self::Drilled;

    /// The namespace prefix applied to every key of this view.
    fn prefix(&self) -> &[u8];
}

impl<T: Kv + ?Sized> Kv for &T {
    type Drilled = T::Drilled;

    fn read(&self, key: &[u8]) -> Result<Option<StateVal>, HistoryError> {
        (**self).read(key)
    }

    fn write(&self, key: &[u8], value: &[u8]) -> Result<(), HistoryError> {
        (**self).write(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), HistoryError> {
        (**self).delete(key)
    }

    fn drill(&self, subkey: &[u8]) -> Self::Drilled {
        (**self).drill(subkey)
    }

    fn prefix(&self) -> &[u8] {
        (**self).prefix()
    }
}

/// Prepends a namespace prefix to a relative key.
#[inline]
pub fn qualify(prefix: &[u8], key: &[u8]) -> Vec<u8> {
    [prefix, key].concat()
}

/// The smallest byte string greater than every string starting with `prefix`,
/// or `None` if no such bound exists (empty or all-`0xFF` prefix).
pub(crate) fn next_prefix(prefix: &[u8]) -> Option<Vec<u8>> {
    if prefix.is_empty() {
        return None;
    }
    let mut ub = prefix.to_vec();
    for i in (0..ub.len()).rev() {
        if let Some(byte) = ub.get_mut(i) {
            if *byte != 0xFF {
                *byte += 1;
                ub.truncate(i + 1);
                return Some(ub);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify_concatenates() {
        assert_eq!(qualify(b"ns/", b"key"), b"ns/key".to_vec());
        assert_eq!(qualify(b"", b"key"), b"key".to_vec());
    }

    #[test]
    fn test_next_prefix_bounds() {
        assert_eq!(next_prefix(b"ab"), Some(b"ac".to_vec()));
        assert_eq!(next_prefix(&[0x01, 0xFF]), Some(vec![0x02]));
        assert_eq!(next_prefix(&[0xFF, 0xFF]), None);
        assert_eq!(next_prefix(b""), None);
    }
}
