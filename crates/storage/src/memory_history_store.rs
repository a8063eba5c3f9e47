// Path: crates/storage/src/memory_history_store.rs

//! A concurrent, in-memory `HistoryKv` with bounded retention.
//!
//! Locking: the version map is a sharded `DashMap`, each key's list has its
//! own `RwLock`, and one store-wide mutex guards the recency buffer and full
//! sweeps. Locks are always taken in the order buffer, then key list. No
//! thread holds a map shard while waiting on a key list.

use crate::buffer::RecencyBuffer;
use crate::collector::Collector;
use crate::metrics::metrics;
use crate::versions::{Floor, VersionList};
use dashmap::DashMap;
use hkv_api::history::{BatchEntry, HistoryKv, SweepStats};
use hkv_api::kv::{qualify, StateKey, StateVal};
use hkv_api::pending::{Horizon, PendingRegistry};
use hkv_telemetry::time::SweepTimer;
use hkv_types::config::HistoryConfig;
use hkv_types::error::HistoryError;
use hkv_types::Token;
use once_cell::unsync::OnceCell;
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

type SharedList = Arc<RwLock<VersionList>>;

/// What trimming did to one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trimmed {
    Nothing,
    Version,
    Key,
}

/// State shared by a store and all of its drilled views.
struct HistoryCore {
    data: DashMap<StateKey, SharedList>,
    buffer: Mutex<RecencyBuffer>,
    pending: Arc<dyn PendingRegistry>,
    config: HistoryConfig,
    collector: Mutex<Option<Collector>>,
}

impl HistoryCore {
    fn list(&self, key: &[u8]) -> Option<SharedList> {
        self.data.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn resolve_horizon(&self) -> Option<Horizon> {
        Horizon::resolve(self.pending.as_ref(), self.config.collect_when_idle)
    }

    /// Re-validates a cached horizon under a key lock, right before a removal.
    ///
    /// A concrete horizon only moves forward, so a stale one is conservative.
    /// A cached `Unbounded` may predate a registration and is resolved again.
    fn confirm_horizon(&self, cached: &Horizon) -> Option<Horizon> {
        match cached {
            Horizon::At(_) => Some(cached.clone()),
            Horizon::Unbounded => self.resolve_horizon(),
        }
    }

    fn read(&self, key: &[u8], token: &Token) -> Result<Option<StateVal>, HistoryError> {
        let Some(list) = self.list(key) else {
            return Ok(None);
        };
        let floor = list.read().floor(token);
        match floor {
            Floor::Absent => Ok(None),
            Floor::Found(value) => Ok(value),
            Floor::Expired { oldest } => {
                metrics().inc_expired_reads();
                tracing::debug!(
                    target: "history",
                    key = %String::from_utf8_lossy(key),
                    requested = %token,
                    oldest = %oldest,
                    "Expired read"
                );
                Err(HistoryError::ExpiredRead {
                    key: key.to_vec(),
                    requested: token.clone(),
                    oldest,
                })
            }
        }
    }

    /// Appends one version under the key's lock, retrying if the list it
    /// found was retired by a concurrent collection.
    fn append(&self, key: &StateKey, token: &Token, value: Option<StateVal>) {
        loop {
            let list = Arc::clone(
                self.data
                    .entry(Arc::clone(key))
                    .or_insert_with(|| Arc::new(RwLock::new(VersionList::default())))
                    .value(),
            );
            let mut versions = list.write();
            if versions.retired {
                drop(versions);
                self.data.remove_if(key, |_, current| Arc::ptr_eq(current, &list));
                continue;
            }
            versions.insert(token, value);
            return;
        }
    }

    fn write_batch(&self, prefix: &[u8], batch: &[BatchEntry], token: &Token) {
        if batch.is_empty() {
            return;
        }
        let mut touched: Vec<StateKey> = Vec::with_capacity(batch.len());
        let mut seen: HashSet<StateKey> = HashSet::with_capacity(batch.len());
        for (key, value) in batch {
            let full: StateKey = Arc::from(qualify(prefix, key));
            self.append(&full, token, value.as_deref().map(StateVal::from));
            if seen.insert(Arc::clone(&full)) {
                touched.push(full);
            }
        }
        metrics().inc_versions_appended(batch.len() as u64);
        self.record(touched);
    }

    /// Records touched keys in the recency buffer, trimming aged entries
    /// first and then making room so the buffer never exceeds `max_size`.
    fn record(&self, touched: Vec<StateKey>) {
        let mut buffer = self.buffer.lock();
        let horizon: OnceCell<Option<Horizon>> = OnceCell::new();
        let now = Instant::now();
        let min_age = self.config.min_age();
        let (mut versions_trimmed, mut keys_collected) = (0u64, 0u64);
        let mut tally = |outcome: Trimmed| match outcome {
            Trimmed::Version => versions_trimmed += 1,
            Trimmed::Key => keys_collected += 1,
            Trimmed::Nothing => {}
        };

        while let Some(key) = buffer.pop_aged(now, min_age) {
            tally(self.trim_key(&key, || horizon.get_or_init(|| self.resolve_horizon()).as_ref()));
        }
        for key in touched {
            while buffer.len() >= self.config.max_size {
                let Some(old) = buffer.pop_front() else {
                    break;
                };
                tally(self.trim_key(&old, || horizon.get_or_init(|| self.resolve_horizon()).as_ref()));
            }
            buffer.push(now, key);
        }

        if versions_trimmed > 0 {
            metrics().inc_versions_trimmed(versions_trimmed);
        }
        if keys_collected > 0 {
            metrics().inc_keys_collected(keys_collected);
        }
        metrics().set_buffer_len(buffer.len() as u64);
    }

    /// Applies the retention rule to one key named by a buffer entry. The
    /// horizon is resolved only if the key still exists.
    ///
    /// Without a horizon (nothing pending, idle collection disabled) the key
    /// is never dropped whole, but its oldest shadowed version still is.
    fn trim_key<'h>(&self, key: &StateKey, horizon: impl FnOnce() -> Option<&'h Horizon>) -> Trimmed {
        let Some(list) = self.list(key) else {
            return Trimmed::Nothing;
        };
        let cached = horizon();
        let mut versions = list.write();
        if versions.retired {
            return Trimmed::Nothing;
        }
        let confirmed = match cached {
            Some(cached) => self.confirm_horizon(cached),
            None => self.resolve_horizon(),
        };
        let Some(horizon) = confirmed else {
            return if versions.trim_oldest(&Horizon::Unbounded) {
                Trimmed::Version
            } else {
                Trimmed::Nothing
            };
        };
        if versions.collectible(&horizon, self.config.purge) {
            versions.retired = true;
            drop(versions);
            self.data.remove_if(key, |_, current| Arc::ptr_eq(current, &list));
            tracing::trace!(target: "history", key = %String::from_utf8_lossy(key), "Collected key under buffer pressure");
            return Trimmed::Key;
        }
        if versions.trim_oldest(&horizon) {
            Trimmed::Version
        } else {
            Trimmed::Nothing
        }
    }

    /// Removes `key` if its list is still collectible, re-checked under the
    /// key's write lock.
    fn retire(&self, key: &StateKey, list: &SharedList, horizon: &Horizon) -> bool {
        {
            let mut versions = list.write();
            if versions.retired {
                return false;
            }
            let Some(horizon) = self.confirm_horizon(horizon) else {
                return false;
            };
            if !versions.collectible(&horizon, self.config.purge) {
                return false;
            }
            versions.retired = true;
        }
        self.data.remove_if(key, |_, current| Arc::ptr_eq(current, list));
        true
    }

    /// One full collection pass. Holds the buffer lock for its duration.
    fn sweep(&self) -> SweepStats {
        let _timer = SweepTimer::start(metrics());
        let _buffer = self.buffer.lock();

        let Some(horizon) = self.resolve_horizon() else {
            tracing::debug!(target: "history::gc", "Nothing pending and idle collection disabled; sweep skipped");
            return SweepStats {
                skipped: true,
                ..SweepStats::default()
            };
        };

        // Snapshot first: removing from a DashMap while iterating it deadlocks.
        let snapshot: Vec<(StateKey, SharedList)> = self
            .data
            .iter()
            .map(|entry| (Arc::clone(entry.key()), Arc::clone(entry.value())))
            .collect();

        let mut stats = SweepStats {
            keys_scanned: snapshot.len(),
            ..SweepStats::default()
        };
        for (key, list) in &snapshot {
            if !list.read().collectible(&horizon, self.config.purge) {
                continue;
            }
            if self.retire(key, list, &horizon) {
                stats.keys_collected += 1;
            }
        }

        if stats.keys_collected > 0 {
            metrics().inc_keys_collected(stats.keys_collected as u64);
            tracing::info!(
                target: "history::gc",
                scanned = stats.keys_scanned,
                collected = stats.keys_collected,
                horizon = ?horizon,
                "Sweep complete"
            );
        } else {
            tracing::debug!(target: "history::gc", scanned = stats.keys_scanned, "Sweep complete, nothing collected");
        }
        stats
    }

    fn shutdown(&self) {
        let collector = self.collector.lock().take();
        if let Some(collector) = collector {
            collector.stop();
            tracing::info!(target: "history", "History collector stopped");
        }
    }
}

/// An in-memory history store with age- and size-bounded retention.
///
/// The store owns its background collector. [`HistoryKv::shutdown`] stops it
/// explicitly; dropping the store stops it as well. Reads and writes keep
/// working after shutdown, only periodic collection ends.
pub struct MemHistoryStore {
    core: Arc<HistoryCore>,
}

impl MemHistoryStore {
    /// Creates a store and starts its collector.
    ///
    /// `pending` is consulted for the retention horizon; the store never
    /// modifies it.
    pub fn new(config: HistoryConfig, pending: Arc<dyn PendingRegistry>) -> Result<Self, HistoryError> {
        config.validate().map_err(HistoryError::InvalidConfig)?;
        let interval = config.gc_interval();
        let core = Arc::new(HistoryCore {
            data: DashMap::new(),
            buffer: Mutex::new(RecencyBuffer::with_capacity(config.max_size.min(4096))),
            pending,
            config,
            collector: Mutex::new(None),
        });

        // The thread holds a weak reference so it never keeps the core alive.
        let weak = Arc::downgrade(&core);
        let collector = Collector::spawn(interval, move || match weak.upgrade() {
            Some(core) => {
                core.sweep();
                true
            }
            None => false,
        })
        .map_err(|e| HistoryError::Backend(format!("Failed to spawn history collector: {}", e)))?;
        *core.collector.lock() = Some(collector);

        tracing::info!(
            target: "history",
            purge = core.config.purge,
            min_age_ms = core.config.min_age_ms,
            max_size = core.config.max_size,
            gc_interval_ms = core.config.gc_interval_ms,
            "History store started"
        );
        Ok(Self { core })
    }

    /// The configuration the store was created with.
    pub fn config(&self) -> &HistoryConfig {
        &self.core.config
    }

    /// Number of keys with retained history.
    pub fn len(&self) -> usize {
        self.core.data.len()
    }

    /// Returns true if no key has retained history.
    pub fn is_empty(&self) -> bool {
        self.core.data.is_empty()
    }

    /// Current number of recency-buffer entries.
    pub fn buffer_len(&self) -> usize {
        self.core.buffer.lock().len()
    }

    /// Number of versions retained for `key`, 0 if none.
    pub fn version_count(&self, key: &[u8]) -> usize {
        self.core.list(key).map_or(0, |list| list.read().len())
    }

    /// The oldest and newest retained tokens for `key`.
    pub fn retained_range(&self, key: &[u8]) -> Option<(Token, Token)> {
        let list = self.core.list(key)?;
        let versions = list.read();
        Some((versions.oldest()?.clone(), versions.newest()?.clone()))
    }

    /// Runs one collection sweep synchronously, with the same rules as the
    /// background collector.
    pub fn collect_now(&self) -> SweepStats {
        self.core.sweep()
    }

    /// True until the collector has been shut down.
    pub fn is_collector_running(&self) -> bool {
        self.core
            .collector
            .lock()
            .as_ref()
            .is_some_and(Collector::is_running)
    }
}

impl HistoryKv for MemHistoryStore {
    type Drilled = HistoryView;

    fn read_at(&self, key: &[u8], token: &Token) -> Result<Option<StateVal>, HistoryError> {
        self.core.read(key, token)
    }

    fn write_batch(&self, batch: &[BatchEntry], token: &Token) -> Result<(), HistoryError> {
        self.core.write_batch(&[], batch, token);
        Ok(())
    }

    fn drill(&self, subkey: &[u8]) -> Self::Drilled {
        HistoryView {
            core: Arc::clone(&self.core),
            prefix: subkey.to_vec(),
        }
    }

    fn prefix(&self) -> &[u8] {
        &[]
    }

    fn shutdown(&self) {
        self.core.shutdown();
    }
}

impl Drop for MemHistoryStore {
    fn drop(&mut self) {
        self.core.shutdown();
    }
}

impl std::fmt::Debug for MemHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemHistoryStore")
            .field("keys", &self.core.data.len())
            .field("config", &self.core.config)
            .finish()
    }
}

/// A namespaced view of a [`MemHistoryStore`], sharing its data.
///
/// Shutting down a view stops the owning store's collector.
#[derive(Clone)]
pub struct HistoryView {
    core: Arc<HistoryCore>,
    prefix: Vec<u8>,
}

impl HistoryKv for HistoryView {
    type Drilled = HistoryView;

    fn read_at(&self, key: &[u8], token: &Token) -> Result<Option<StateVal>, HistoryError> {
        self.core.read(&qualify(&self.prefix, key), token)
    }

    fn write_batch(&self, batch: &[BatchEntry], token: &Token) -> Result<(), HistoryError> {
        self.core.write_batch(&self.prefix, batch, token);
        Ok(())
    }

    fn drill(&self, subkey: &[u8]) -> Self::Drilled {
        HistoryView {
            core: Arc::clone(&self.core),
            prefix: qualify(&self.prefix, subkey),
        }
    }

    fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    fn shutdown(&self) {
        self.core.shutdown();
    }
}

impl std::fmt::Debug for HistoryView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryView")
            .field("prefix", &String::from_utf8_lossy(&self.prefix))
            .finish()
    }
}

#[cfg(test)]
mod tests;
