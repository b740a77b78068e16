//! Configuration Module
//!
//! Per-cache construction options and the diagnostics server configuration
//! loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage::SessionStore;

/// Default entry lifetime of a generic cache.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
/// Default capacity of a generic cache.
pub const DEFAULT_MAX_SIZE: usize = 100;
/// Default lifetime of remote-read entries.
pub const REMOTE_TTL: Duration = Duration::from_secs(10 * 60);
/// Default capacity of the remote-read cache.
pub const REMOTE_MAX_SIZE: usize = 500;
/// Default lifetime of query results.
pub const QUERY_TTL: Duration = Duration::from_secs(2 * 60);
/// Interval between expiry sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// == Storage Kind ==
/// Where a cache keeps its snapshot between mutations.
#[derive(Debug, Clone, Default)]
pub enum StorageKind {
    /// No persistence
    #[default]
    Memory,
    /// Durable keyed store on disk
    Durable { path: PathBuf },
    /// Store shared for the lifetime of the session
    Session(SessionStore),
}

impl StorageKind {
    pub fn is_persistent(&self) -> bool {
        !matches!(self, StorageKind::Memory)
    }
}

// == Cache Config ==
/// Construction options of a single cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Default entry lifetime
    pub ttl: Duration,
    /// Maximum number of entries before oldest-eviction
    pub max_size: usize,
    /// Snapshot backend
    pub storage: StorageKind,
    /// Snapshot namespace, distinguishes caches sharing a backend
    pub namespace: String,
}

impl CacheConfig {
    /// Remote-read preset: longer lifetime, larger capacity, persisted.
    pub fn remote(storage: StorageKind) -> Self {
        Self {
            ttl: REMOTE_TTL,
            max_size: REMOTE_MAX_SIZE,
            storage,
            namespace: "remote".to_string(),
        }
    }

    /// Query-result preset: short lifetime, memory only.
    pub fn query() -> Self {
        Self {
            ttl: QUERY_TTL,
            namespace: "query".to_string(),
            ..Self::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_size: DEFAULT_MAX_SIZE,
            storage: StorageKind::Memory,
            namespace: "default".to_string(),
        }
    }
}

// == Server Config ==
/// Diagnostics server configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Capacity of the remote-read cache
    pub remote_max_size: usize,
    /// Default lifetime of remote-read entries in milliseconds
    pub remote_ttl_ms: u64,
    /// Capacity of the query-result cache
    pub query_max_size: usize,
    /// Default lifetime of query results in milliseconds
    pub query_ttl_ms: u64,
    /// Expiry sweep interval in seconds
    pub sweep_interval: u64,
    /// Directory of the durable snapshot store, None = session store
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `REMOTE_MAX_SIZE` - Remote cache capacity (default: 500)
    /// - `REMOTE_TTL_MS` - Remote entry lifetime (default: 600000)
    /// - `QUERY_MAX_SIZE` - Query cache capacity (default: 100)
    /// - `QUERY_TTL_MS` - Query entry lifetime (default: 120000)
    /// - `SWEEP_INTERVAL_SECS` - Expiry sweep frequency (default: 60)
    /// - `CACHE_DIR` - Durable snapshot directory (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            remote_max_size: parse_var("REMOTE_MAX_SIZE").unwrap_or(defaults.remote_max_size),
            remote_ttl_ms: parse_var("REMOTE_TTL_MS").unwrap_or(defaults.remote_ttl_ms),
            query_max_size: parse_var("QUERY_MAX_SIZE").unwrap_or(defaults.query_max_size),
            query_ttl_ms: parse_var("QUERY_TTL_MS").unwrap_or(defaults.query_ttl_ms),
            sweep_interval: parse_var("SWEEP_INTERVAL_SECS").unwrap_or(defaults.sweep_interval),
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Remote cache options derived from this configuration.
    pub fn remote_cache(&self) -> CacheConfig {
        let storage = match &self.cache_dir {
            Some(dir) => StorageKind::Durable { path: dir.clone() },
            None => StorageKind::Session(SessionStore::new()),
        };
        CacheConfig::remote(storage)
            .with_max_size(self.remote_max_size)
            .with_ttl(Duration::from_millis(self.remote_ttl_ms))
    }

    /// Query cache options derived from this configuration.
    pub fn query_cache(&self) -> CacheConfig {
        CacheConfig::query()
            .with_max_size(self.query_max_size)
            .with_ttl(Duration::from_millis(self.query_ttl_ms))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            remote_max_size: REMOTE_MAX_SIZE,
            remote_ttl_ms: REMOTE_TTL.as_millis() as u64,
            query_max_size: DEFAULT_MAX_SIZE,
            query_ttl_ms: QUERY_TTL.as_millis() as u64,
            sweep_interval: SWEEP_INTERVAL.as_secs(),
            cache_dir: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert_eq!(config.max_size, 100);
        assert!(!config.storage.is_persistent());
    }

    #[test]
    fn test_presets() {
        let remote = CacheConfig::remote(StorageKind::Session(SessionStore::new()));
        assert!(remote.ttl > DEFAULT_TTL);
        assert!(remote.max_size > DEFAULT_MAX_SIZE);
        assert!(remote.storage.is_persistent());

        let query = CacheConfig::query();
        assert_eq!(query.ttl, Duration::from_secs(120));
        assert!(!query.storage.is_persistent());
        assert_ne!(query.namespace, remote.namespace);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.remote_max_size, 500);
        assert_eq!(config.remote_ttl_ms, 600_000);
        assert_eq!(config.query_ttl_ms, 120_000);
        assert_eq!(config.sweep_interval, 60);
        assert!(config.cache_dir.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("REMOTE_MAX_SIZE");
        env::remove_var("REMOTE_TTL_MS");
        env::remove_var("QUERY_MAX_SIZE");
        env::remove_var("QUERY_TTL_MS");
        env::remove_var("SWEEP_INTERVAL_SECS");
        env::remove_var("CACHE_DIR");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.query_max_size, 100);
        assert_eq!(config.sweep_interval(), SWEEP_INTERVAL);
        assert!(matches!(
            config.remote_cache().storage,
            StorageKind::Session(_)
        ));
    }

    #[test]
    fn test_remote_cache_uses_durable_dir() {
        let config = Config {
            cache_dir: Some(PathBuf::from("/tmp/fetch_cache")),
            remote_ttl_ms: 1_000,
            ..Config::default()
        };
        let remote = config.remote_cache();
        assert_eq!(remote.ttl, Duration::from_secs(1));
        assert!(matches!(remote.storage, StorageKind::Durable { .. }));
    }
}
