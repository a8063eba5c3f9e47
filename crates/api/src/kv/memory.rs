// Path: crates/api/src/kv/memory.rs

//! An ordered in-memory `Kv`, used for debugging and as a test double.

use super::{next_prefix, qualify, Kv, StateVal};
use hkv_types::error::HistoryError;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

/// A `BTreeMap`-backed store. Clones and drilled children share one map.
#[derive(Clone, Debug, Default)]
pub struct MemoryKv {
    map: Arc<RwLock<BTreeMap<Vec<u8>, StateVal>>>,
    prefix: Vec<u8>,
}

impl MemoryKv {
    /// Creates an empty store with an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all pairs whose key starts with `sub`, in key order.
    ///
    /// Keys are returned relative to this view's namespace.
    pub fn scan_prefix(&self, sub: &[u8]) -> Vec<(Vec<u8>, StateVal)> {
        let start = qualify(&self.prefix, sub);
        let end = match next_prefix(&start) {
            Some(ub) => Bound::Excluded(ub),
            None => Bound::Unbounded,
        };
        let strip = self.prefix.len();
        self.map
            .read()
            .range((Bound::Included(start), end))
            .filter_map(|(k, v)| k.get(strip..).map(|rel| (rel.to_vec(), v.clone())))
            .collect()
    }

    /// Number of entries in the whole backing map, across all namespaces.
    pub fn total_len(&self) -> usize {
        self.map.read().len()
    }
}

impl Kv for MemoryKv {
    type Drilled = MemoryKv;

    fn read(&self, key: &[u8]) -> Result<Option<StateVal>, HistoryError> {
        Ok(self.map.read().get(&qualify(&self.prefix, key)).cloned())
    }

    fn write(&self, key: &[u8], value: &[u8]) -> Result<(), HistoryError> {
        self.map
            .write()
            .insert(qualify(&self.prefix, key), Arc::from(value));
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), HistoryError> {
        self.map.write().remove(&qualify(&self.prefix, key));
        Ok(())
    }

    fn drill(&self, subkey: &[u8]) -> Self::Drilled {
        Self {
            map: Arc::clone(&self.map),
            prefix: qualify(&self.prefix, subkey),
        }
    }

    fn prefix(&self) -> &[u8] {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_delete() {
        let kv = MemoryKv::new();
        assert_eq!(kv.read(b"a").unwrap(), None);
        kv.write(b"a", b"1").unwrap();
        assert_eq!(kv.read(b"a").unwrap().as_deref(), Some(&b"1"[..]));
        kv.write(b"a", b"2").unwrap();
        assert_eq!(kv.read(b"a").unwrap().as_deref(), Some(&b"2"[..]));
        kv.delete(b"a").unwrap();
        assert_eq!(kv.read(b"a").unwrap(), None);
    }

    #[test]
    fn test_drilled_views_share_backing() {
        let root = MemoryKv::new();
        let users = root.drill(b"users/");
        let alice = users.drill(b"alice/");
        assert_eq!(alice.prefix(), b"users/alice/");

        alice.write(b"age", b"30").unwrap();
        assert_eq!(
            root.read(b"users/alice/age").unwrap().as_deref(),
            Some(&b"30"[..])
        );
        assert_eq!(users.read(b"alice/age").unwrap().as_deref(), Some(&b"30"[..]));

        root.delete(b"users/alice/age").unwrap();
        assert_eq!(alice.read(b"age").unwrap(), None);
    }

    #[test]
    fn test_scan_prefix_is_ordered_and_relative() {
        let root = MemoryKv::new();
        let ns = root.drill(b"ns/");
        ns.write(b"b", b"2").unwrap();
        ns.write(b"a", b"1").unwrap();
        ns.write(b"ab", b"3").unwrap();
        root.write(b"other", b"x").unwrap();

        let all: Vec<Vec<u8>> = ns.scan_prefix(b"").into_iter().map(|(k, _)| k).collect();
        assert_eq!(all, vec![b"a".to_vec(), b"ab".to_vec(), b"b".to_vec()]);

        let under_a = ns.scan_prefix(b"a");
        assert_eq!(under_a.len(), 2);
        assert_eq!(root.total_len(), 4);
    }
}
