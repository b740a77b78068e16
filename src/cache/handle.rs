//! Shared cache handle.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::{CacheStats, CacheStore, CacheValue};
use crate::config::CacheConfig;
use crate::tasks::{spawn_sweep_task, SweepHandle};

/// Cloneable handle to one [`CacheStore`].
///
/// Every operation takes the lock for its whole duration and never awaits
/// while holding it, so reads, writes and the periodic sweep are serialized.
#[derive(Debug)]
pub struct TtlCache<V> {
    store: Arc<Mutex<CacheStore<V>>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<V: CacheValue> TtlCache<V> {
    pub fn new(config: &CacheConfig) -> Self {
        Self::from_store(CacheStore::new(config))
    }

    pub fn from_store(store: CacheStore<V>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub fn set(&self, key: impl Into<String>, data: V, ttl: Option<Duration>) {
        self.store.lock().set(key, data, ttl);
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.store.lock().get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.store.lock().has(key)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.store.lock().delete(key)
    }

    pub fn clear(&self) {
        self.store.lock().clear();
    }

    pub fn sweep_expired(&self) -> usize {
        self.store.lock().sweep_expired()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.lock().keys()
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn default_ttl(&self) -> Duration {
        self.store.lock().default_ttl()
    }

    /// Starts the periodic expiry sweep. The task ends when the returned
    /// handle is stopped or dropped, or once every clone of this cache is gone.
    pub fn spawn_sweeper(&self, interval: Duration) -> SweepHandle {
        spawn_sweep_task(self.downgrade(), interval)
    }

    pub(crate) fn downgrade(&self) -> Weak<Mutex<CacheStore<V>>> {
        Arc::downgrade(&self.store)
    }
}
