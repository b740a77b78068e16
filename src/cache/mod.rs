//! Cache Module
//!
//! Provides a generic capacity-bounded cache with per-entry TTL, lazy
//! expiration, oldest-first eviction and optional snapshot persistence.

mod entry;
mod handle;
mod order;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

use serde::de::DeserializeOwned;
use serde::Serialize;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use handle::TtlCache;
pub use order::InsertionOrder;
pub use stats::{CacheStats, EntryStats};
pub use store::CacheStore;

/// Values a cache can hold: cloned out on reads and serialized into snapshots.
pub trait CacheValue: Clone + Serialize + DeserializeOwned + Send + 'static {}

impl<T> CacheValue for T where T: Clone + Serialize + DeserializeOwned + Send + 'static {}
