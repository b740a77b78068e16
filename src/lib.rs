//! Fetch Cache - client-side caching for remote reads
//!
//! Provides a generic TTL cache with oldest-first eviction and snapshot
//! persistence, a request-coalescing wrapper for remote fetches, and a
//! query-result cache with deterministic keys.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod layer;
pub mod models;
pub mod query;
pub mod remote;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStats, TtlCache};
pub use config::{CacheConfig, Config, StorageKind};
pub use error::{CacheError, Result};
pub use keys::{cached, generate_api_key, generate_entity_key, Cached};
pub use layer::CacheLayer;
pub use query::QueryCache;
pub use remote::{FetchOptions, RemoteCache};
