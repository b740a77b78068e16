//! Query-Result Cache Module
//!
//! A session-scoped cache for parameterized reads whose keys are derived
//! deterministically from an endpoint name and its parameters.

use std::time::Duration;

use serde_json::{Map, Value};
use tracing::debug;

use crate::cache::{CacheStats, CacheValue, TtlCache};
use crate::config::CacheConfig;
use crate::tasks::SweepHandle;

/// Query-result cache. Holds JSON values unless told otherwise.
#[derive(Debug, Clone)]
pub struct QueryCache<V = Value> {
    cache: TtlCache<V>,
}

impl<V: CacheValue> QueryCache<V> {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            cache: TtlCache::new(config),
        }
    }

    // == Generate Key ==
    /// Builds `endpoint:<params>` with parameter names serialized in sorted
    /// order, so logically identical parameter sets share a key regardless
    /// of the order fields were supplied in.
    pub fn generate_key(endpoint: &str, params: &Value) -> String {
        format!("{}:{}", endpoint, canonicalize(params))
    }

    pub fn get(&self, endpoint: &str, params: &Value) -> Option<V> {
        self.cache.get(&Self::generate_key(endpoint, params))
    }

    pub fn set(&self, endpoint: &str, params: &Value, data: V) {
        self.cache.set(Self::generate_key(endpoint, params), data, None);
    }

    /// Stores with an explicit lifetime instead of the cache default.
    pub fn set_with_ttl(&self, endpoint: &str, params: &Value, data: V, ttl: Duration) {
        self.cache
            .set(Self::generate_key(endpoint, params), data, Some(ttl));
    }

    // == Invalidate Queries ==
    /// Removes every held result of `endpoint`. Returns the number removed.
    pub fn invalidate_queries(&self, endpoint: &str) -> usize {
        let prefix = format!("{}:", endpoint);
        let removed = self
            .cache
            .stats()
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .filter(|key| self.cache.delete(key))
            .count();

        debug!(endpoint, removed, "Invalidated query results");
        removed
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn spawn_sweeper(&self, interval: Duration) -> SweepHandle {
        self.cache.spawn_sweeper(interval)
    }
}

/// Rebuilds `value` with every object's keys inserted in sorted order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut names: Vec<&String> = map.keys().collect();
            names.sort();

            let mut sorted = Map::with_capacity(map.len());
            for name in names {
                sorted.insert(name.clone(), canonicalize(&map[name.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
