//! Snapshot Storage Module
//!
//! Backends that hold the serialized entry map of a cache between runs.
//! A backend stores one snapshot per key and only ever sees full-snapshot
//! overwrites.

mod session;
mod sled_store;

use std::fmt;
use std::sync::Arc;

pub use session::SessionStore;
pub use sled_store::SledStore;

use crate::config::StorageKind;
use crate::error::Result;

/// Prefix applied to every snapshot key.
pub const SNAPSHOT_KEY_PREFIX: &str = "fetch_cache";

// == Snapshot Store ==
/// A keyed store of serialized cache snapshots.
///
/// Implementations are synchronous; the cache never awaits while persisting.
pub trait SnapshotStore: Send + Sync + fmt::Debug {
    /// Returns the snapshot stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Overwrites the snapshot stored under `key`.
    fn save(&self, key: &str, snapshot: &str) -> Result<()>;
}

/// Builds the namespaced key a cache stores its snapshot under.
pub fn snapshot_key(namespace: &str) -> String {
    format!("{}:{}", SNAPSHOT_KEY_PREFIX, namespace)
}

/// Opens the backend selected by `kind`.
///
/// Returns `Ok(None)` for memory-only caches.
pub fn open(kind: &StorageKind) -> Result<Option<Arc<dyn SnapshotStore>>> {
    match kind {
        StorageKind::Memory => Ok(None),
        StorageKind::Durable { path } => Ok(Some(SledStore::open_shared(path)?)),
        StorageKind::Session(store) => Ok(Some(Arc::new(store.clone()))),
    }
}
