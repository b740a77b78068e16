//! Session-scoped snapshot store.
//!
//! Items live for as long as any clone of the store is alive. Nothing is
//! written to disk.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::SnapshotStore;
use crate::error::{CacheError, Result};

/// In-process keyed store shared by every clone.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    items: Arc<Mutex<HashMap<String, String>>>,
    /// Maximum snapshot size in bytes, None = unlimited
    quota: Option<usize>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects snapshots larger than `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: Arc::default(),
            quota: Some(quota),
        }
    }

    /// Writes a raw item, bypassing the quota. Used to seed prior state.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.items.lock().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.items.lock().remove(key)
    }
}

impl SnapshotStore for SessionStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn save(&self, key: &str, snapshot: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            if snapshot.len() > quota {
                return Err(CacheError::Persistence(format!(
                    "Snapshot of {} bytes exceeds session quota of {} bytes",
                    snapshot.len(),
                    quota
                )));
            }
        }

        self.items
            .lock()
            .insert(key.to_string(), snapshot.to_string());
        Ok(())
    }
}
