//! Durable snapshot store backed by sled.
//!
//! sled locks its directory exclusively, so caches in one process share a
//! single open database per path through [`SledStore::open_shared`].
//! Separate processes cannot share a directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::debug;

use super::SnapshotStore;
use crate::error::{CacheError, Result};

/// Databases currently open in this process, by resolved path.
static OPEN_STORES: Lazy<Mutex<HashMap<PathBuf, Weak<SledStore>>>> = Lazy::new(Mutex::default);

/// Sled-based durable keyed store.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Opens (or creates) the store at `path`.
    /// Creates the parent directory if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CacheError::Persistence(format!("Failed to create directory: {}", e))
            })?;
        }

        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Returns the store already open at `path` in this process, opening it
    /// if none is. The database closes once every handle is dropped.
    pub fn open_shared(path: impl AsRef<Path>) -> Result<Arc<Self>> {
        let path = path.as_ref();
        let mut open = OPEN_STORES.lock();

        let id = resolve(path);
        if let Some(store) = open.get(&id).and_then(Weak::upgrade) {
            debug!(path = %path.display(), "Reusing open snapshot database");
            return Ok(store);
        }

        open.retain(|_, store| store.strong_count() > 0);
        let store = Arc::new(Self::open(path)?);
        open.insert(resolve(path), Arc::downgrade(&store));
        Ok(store)
    }
}

/// Canonical form of `path` once its parent exists, so different spellings
/// of one directory share a database.
fn resolve(path: &Path) -> PathBuf {
    let parent = path.parent().and_then(|p| p.canonicalize().ok());
    match (parent, path.file_name()) {
        (Some(parent), Some(name)) => parent.join(name),
        _ => path.to_path_buf(),
    }
}

impl SnapshotStore for SledStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let Some(bytes) = self.db.get(key.as_bytes())? else {
            return Ok(None);
        };

        String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|e| CacheError::Persistence(format!("Snapshot is not valid UTF-8: {}", e)))
    }

    fn save(&self, key: &str, snapshot: &str) -> Result<()> {
        self.db.insert(key.as_bytes(), snapshot.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}
