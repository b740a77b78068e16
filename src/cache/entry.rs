//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// Represents a single cache entry with its data and expiry metadata.
///
/// Serialized as `{ data, createdAt, ttl, key }` inside persisted snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    /// The stored value
    pub data: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Lifetime in milliseconds
    pub ttl: u64,
    /// Key the entry is stored under
    pub key: String,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(key: impl Into<String>, data: V, ttl: Duration) -> Self {
        Self {
            data,
            created_at: current_timestamp_ms(),
            ttl: duration_ms(ttl),
            key: key.into(),
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was created.
    pub fn age_ms(&self) -> u64 {
        (current_timestamp_ms() - self.created_at).max(0) as u64
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry stays valid while `now - created_at <= ttl`
    /// and is expired only once the age strictly exceeds its ttl.
    pub fn is_expired(&self) -> bool {
        self.age_ms() > self.ttl
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.ttl.saturating_sub(self.age_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
