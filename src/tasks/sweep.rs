//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries, so
//! entries written but never read again do not accumulate.

use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheStore, CacheValue};

// == Sweep Handle ==
/// Owns a running sweep task. Dropping the handle stops the task.
#[derive(Debug)]
pub struct SweepHandle {
    handle: JoinHandle<()>,
}

impl SweepHandle {
    /// Stops the task.
    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns a task that sweeps `cache` every `interval`.
///
/// The task holds only a weak reference and exits on its own once the
/// cache has been dropped.
///
/// # Example
/// ```ignore
/// let cache = TtlCache::new(&CacheConfig::default());
/// let sweeper = cache.spawn_sweeper(Duration::from_secs(60));
/// // Later, during shutdown:
/// sweeper.stop();
/// ```
pub fn spawn_sweep_task<V: CacheValue>(
    cache: Weak<Mutex<CacheStore<V>>>,
    interval: Duration,
) -> SweepHandle {
    let handle = tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let Some(store) = cache.upgrade() else {
                debug!("Cache dropped, expiry sweep task exiting");
                break;
            };
            let removed = store.lock().sweep_expired();

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    });

    SweepHandle { handle }
}
