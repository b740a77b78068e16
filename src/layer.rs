//! Cache Layer Module
//!
//! Explicitly constructed owner of the remote-fetch cache, the query-result
//! cache and their sweep tasks. Callers receive the caches from a layer
//! instead of reaching for process-wide instances.

use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::config::{CacheConfig, Config};
use crate::query::QueryCache;
use crate::remote::RemoteCache;
use crate::tasks::SweepHandle;

/// One remote cache and one query cache with a shared lifecycle.
#[derive(Debug)]
pub struct CacheLayer {
    remote: RemoteCache,
    queries: QueryCache<Value>,
    sweepers: Vec<SweepHandle>,
}

impl CacheLayer {
    /// Builds both caches without starting any background work.
    pub fn new(remote: &CacheConfig, queries: &CacheConfig) -> Self {
        Self {
            remote: RemoteCache::new(remote),
            queries: QueryCache::new(queries),
            sweepers: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.remote_cache(), &config.query_cache())
    }

    /// Starts the periodic expiry sweep of both caches. Must be called from
    /// within a Tokio runtime. Calling it again restarts the sweeps.
    pub fn start(&mut self, sweep_interval: Duration) {
        self.sweepers = vec![
            self.remote.spawn_sweeper(sweep_interval),
            self.queries.spawn_sweeper(sweep_interval),
        ];
        info!(
            interval_secs = sweep_interval.as_secs(),
            "Cache layer sweep tasks started"
        );
    }

    /// Stops the sweep tasks. The caches stay usable.
    pub fn shutdown(&mut self) {
        for sweeper in self.sweepers.drain(..) {
            sweeper.stop();
        }
        info!("Cache layer sweep tasks stopped");
    }

    pub fn is_running(&self) -> bool {
        self.sweepers.iter().any(|s| !s.is_finished())
    }

    pub fn remote(&self) -> &RemoteCache {
        &self.remote
    }

    pub fn queries(&self) -> &QueryCache<Value> {
        &self.queries
    }
}
