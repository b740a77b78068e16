//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with insertion-order tracking,
//! lazy TTL expiration and full-snapshot persistence.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, CacheValue, EntryStats, InsertionOrder};
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::storage::{self, SnapshotStore};

// == Cache Store ==
/// Capacity-bounded key/value storage where every entry carries its own expiry.
///
/// All methods are synchronous. Persistence failures are logged and never
/// reach the caller; the in-memory mutation always succeeds.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion order for eviction
    order: InsertionOrder,
    /// Hit/miss/eviction counters
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
    /// Lifetime applied when `set` is given no ttl
    default_ttl: Duration,
    /// Snapshot backend, None = memory only
    backend: Option<Arc<dyn SnapshotStore>>,
    /// Key the snapshot is stored under
    snapshot_key: String,
}

impl<V: CacheValue> CacheStore<V> {
    // == Constructor ==
    /// Creates a store from `config`, restoring a previous snapshot if the
    /// configured backend holds one.
    ///
    /// A backend that cannot be opened degrades the store to memory only.
    pub fn new(config: &CacheConfig) -> Self {
        debug!(
            namespace = %config.namespace,
            persistent = config.storage.is_persistent(),
            "Opening cache store"
        );
        let backend = match storage::open(&config.storage) {
            Ok(backend) => backend,
            Err(err) => {
                warn!(error = %err, "Snapshot backend unavailable, caching in memory only");
                None
            }
        };

        Self::with_backend(
            config.max_size,
            config.ttl,
            backend,
            storage::snapshot_key(&config.namespace),
        )
    }

    /// Creates a memory-only store.
    pub fn in_memory(max_size: usize, default_ttl: Duration) -> Self {
        Self::with_backend(max_size, default_ttl, None, String::new())
    }

    /// Creates a store over an explicit backend.
    pub fn with_backend(
        max_size: usize,
        default_ttl: Duration,
        backend: Option<Arc<dyn SnapshotStore>>,
        snapshot_key: String,
    ) -> Self {
        let max_size = max_size.max(1);
        let mut store = Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(max_size),
            max_size,
            default_ttl,
            backend,
            snapshot_key,
        };
        store.restore();
        store
    }

    // == Set ==
    /// Stores a value, replacing any previous entry under the same key.
    ///
    /// A new key arriving while the cache is full first evicts the oldest
    /// inserted entry. An overwritten key keeps its insertion position.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `data` - The value to store
    /// * `ttl` - Optional lifetime (uses the default ttl if None)
    pub fn set(&mut self, key: impl Into<String>, data: V, ttl: Option<Duration>) {
        let key = key.into();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            if let Some(evicted) = self.order.pop_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!(key = %evicted, "Evicted oldest cache entry");
            }
        }

        let entry = CacheEntry::new(key.clone(), data, ttl.unwrap_or(self.default_ttl));
        self.order.insert(&key);
        self.entries.insert(key, entry);

        self.persist();
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed on the spot and reported as misses.
    pub fn get(&mut self, key: &str) -> Option<V> {
        if !self.retain_if_live(key) {
            self.stats.record_miss();
            debug!(key, "Cache miss");
            return None;
        }

        self.stats.record_hit();
        debug!(key, "Cache hit");
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    // == Has ==
    /// Same expiry check (and lazy removal) as `get`, without cloning the value.
    pub fn has(&mut self, key: &str) -> bool {
        self.retain_if_live(key)
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            self.persist();
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Empties the cache and persists an empty snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.persist();
    }

    // == Sweep Expired ==
    /// Removes all expired entries, persisting once if any were removed.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.order.remove(key);
        }

        if !expired_keys.is_empty() {
            self.persist();
        }
        expired_keys.len()
    }

    // == Stats ==
    /// Returns capacity, counters and every live entry, oldest first.
    ///
    /// Expired entries still awaiting lazy removal are neither listed nor
    /// counted in `size`.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.entries = self
            .order
            .iter()
            .filter_map(|key| self.entries.get(key))
            .filter(|entry| !entry.is_expired())
            .map(|entry| EntryStats {
                key: entry.key.clone(),
                age_ms: entry.age_ms(),
                ttl_ms: entry.ttl,
            })
            .collect();
        stats.size = stats.entries.len();
        stats
    }

    /// Keys currently held, oldest first. Expired entries not yet touched
    /// are included.
    pub fn keys(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn is_persistent(&self) -> bool {
        self.backend.is_some()
    }

    // == Lazy Expiry ==
    /// Returns true if `key` holds a live entry. An expired entry is removed
    /// and the removal persisted.
    fn retain_if_live(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };

        if expired {
            self.entries.remove(key);
            self.order.remove(key);
            self.persist();
            debug!(key, "Cache entry expired");
            return false;
        }
        true
    }

    // == Persistence ==
    /// Overwrites the stored snapshot with the full current map.
    fn persist(&self) {
        let Some(backend) = &self.backend else {
            return;
        };

        let snapshot = Snapshot {
            order: &self.order,
            entries: &self.entries,
        };

        let result = serde_json::to_string(&snapshot)
            .map_err(CacheError::from)
            .and_then(|raw| backend.save(&self.snapshot_key, &raw));

        if let Err(err) = result {
            warn!(
                snapshot = %self.snapshot_key,
                error = %err,
                "Failed to persist cache snapshot"
            );
        }
    }

    /// Loads the stored snapshot. Missing, unreadable or malformed snapshots
    /// leave the store empty.
    fn restore(&mut self) {
        let Some(backend) = &self.backend else {
            return;
        };

        let raw = match backend.load(&self.snapshot_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(err) => {
                warn!(snapshot = %self.snapshot_key, error = %err, "Failed to read cache snapshot");
                return;
            }
        };

        let loaded = match serde_json::from_str::<SnapshotEntries<V>>(&raw) {
            Ok(SnapshotEntries(entries)) => entries,
            Err(err) => {
                warn!(
                    snapshot = %self.snapshot_key,
                    error = %err,
                    "Discarding malformed cache snapshot"
                );
                return;
            }
        };

        // Snapshot is oldest first; keep only the newest entries that fit
        let skip = loaded.len().saturating_sub(self.max_size);

        for entry in loaded.into_iter().skip(skip) {
            self.order.insert(&entry.key);
            self.entries.insert(entry.key.clone(), entry);
        }

        debug!(
            snapshot = %self.snapshot_key,
            entries = self.entries.len(),
            "Restored cache snapshot"
        );
    }
}

// == Snapshot ==
/// Serializes the entry map as `{ key: entry }` in insertion order.
struct Snapshot<'a, V> {
    order: &'a InsertionOrder,
    entries: &'a HashMap<String, CacheEntry<V>>,
}

impl<V: Serialize> Serialize for Snapshot<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.order
                .iter()
                .filter_map(|key| self.entries.get(key).map(|entry| (key, entry))),
        )
    }
}

/// Entries of a snapshot in stored order. The map key is authoritative.
struct SnapshotEntries<V>(Vec<CacheEntry<V>>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for SnapshotEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = SnapshotEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of cache entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, mut entry)) = map.next_entry::<String, CacheEntry<V>>()? {
                    entry.key = key;
                    entries.push(entry);
                }
                Ok(SnapshotEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}
