//! Remote-Fetch Cache Module
//!
//! Wraps a [`TtlCache`] for remote reads, adding in-flight request
//! coalescing, forced refresh and pattern-based invalidation.

mod pattern;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

pub use pattern::{GlobMatcher, MAX_PATTERN_LENGTH};

use crate::cache::{CacheStats, TtlCache};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::SweepHandle;

/// Result handle shared by every caller waiting on one fetch.
type PendingFetch = Shared<BoxFuture<'static, Result<Value>>>;

type PendingMap = Arc<Mutex<HashMap<String, PendingFetch>>>;

// == Fetch Options ==
/// Per-call options of [`RemoteCache::get`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Lifetime of the stored result, None = cache default
    pub ttl: Option<Duration>,
    /// Skip the cache lookup and fetch (or join an in-flight fetch)
    pub force_refresh: bool,
}

impl FetchOptions {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }
}

// == Remote Cache ==
/// Cache for remote reads with at most one in-flight fetch per key.
///
/// Values are held as JSON so that one cache can serve results of any
/// serializable type and persist them.
#[derive(Clone)]
pub struct RemoteCache {
    cache: TtlCache<Value>,
    pending: PendingMap,
}

enum Lookup {
    Cached(Value),
    InFlight(PendingFetch),
    /// Registered but not started; the caller runs the fetch.
    Claimed(Claim),
}

/// Exclusive right to run the fetch for a key registered as pending.
struct Claim {
    shared: PendingFetch,
    sender: oneshot::Sender<Result<Value>>,
    registration: Registration,
}

impl RemoteCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::from_cache(TtlCache::new(config))
    }

    pub fn from_cache(cache: TtlCache<Value>) -> Self {
        Self {
            cache,
            pending: Arc::default(),
        }
    }

    // == Get ==
    /// Returns the value for `key`, fetching it at most once across all
    /// concurrent callers.
    ///
    /// 1. Unless `force_refresh` is set, a live cached value is returned
    ///    without calling `fetch`.
    /// 2. A fetch already in flight for `key` is joined; every waiter sees
    ///    the same outcome.
    /// 3. Otherwise `fetch` is started and registered before it can settle.
    ///    Success stores the result with the requested ttl. Failure reaches
    ///    every waiter and is not cached.
    ///
    /// A started fetch runs to completion even if every caller goes away.
    pub async fn get<T, F, Fut>(&self, key: &str, fetch: F, options: FetchOptions) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let value = match self.lookup(key, options.force_refresh) {
            Lookup::Cached(value) => value,
            Lookup::InFlight(pending) => pending.await?,
            Lookup::Claimed(claim) => {
                // Runs outside the lock: the fetch may use this cache
                let fetching = fetch();
                tokio::spawn(settle(
                    claim.registration,
                    fetching,
                    self.cache.clone(),
                    options.ttl,
                    claim.sender,
                ));
                claim.shared.await?
            }
        };
        Ok(serde_json::from_value(value)?)
    }

    /// Cache check, pending check and registration under one lock, so two
    /// back-to-back calls cannot both start a fetch. No caller code runs
    /// while the lock is held.
    fn lookup(&self, key: &str, force_refresh: bool) -> Lookup {
        let mut pending = self.pending.lock();

        if !force_refresh {
            if let Some(value) = self.cache.get(key) {
                return Lookup::Cached(value);
            }
        }

        if let Some(in_flight) = pending.get(key) {
            debug!(key, "Joining in-flight fetch");
            return Lookup::InFlight(in_flight.clone());
        }

        debug!(key, force_refresh, "Starting fetch");
        let (sender, receiver) = oneshot::channel();
        let shared = async move {
            receiver.await.unwrap_or_else(|_| {
                Err(CacheError::Internal("Fetch ended without a result".to_string()))
            })
        }
        .boxed()
        .shared();

        pending.insert(key.to_string(), shared.clone());
        Lookup::Claimed(Claim {
            shared,
            sender,
            registration: Registration {
                key: key.to_string(),
                pending: Arc::clone(&self.pending),
            },
        })
    }

    // == Invalidate ==
    /// Removes cached entries.
    ///
    /// With no pattern (or an empty one) the whole cache is cleared.
    /// Otherwise the pattern is compiled as a `*` glob and every live key it
    /// matches is deleted. Returns the number of live entries removed.
    pub fn invalidate(&self, pattern: Option<&str>) -> Result<usize> {
        let Some(pattern) = pattern.filter(|p| !p.is_empty()) else {
            let removed = self.cache.stats().size;
            self.cache.clear();
            info!(removed, "Invalidated entire remote cache");
            return Ok(removed);
        };

        let matcher = GlobMatcher::compile(pattern)?;
        let removed = self
            .cache
            .stats()
            .keys()
            .filter(|key| matcher.is_match(key))
            .filter(|key| self.cache.delete(key))
            .count();

        debug!(pattern, removed, "Invalidated remote cache entries");
        Ok(removed)
    }

    // == Invalidate Related ==
    /// Invalidates everything a write to `entity` may have made stale: the
    /// entity's keys, its plural listing keys, dashboard and stats views,
    /// and the single record's keys when `id` is given.
    pub fn invalidate_related(&self, entity: &str, id: Option<&str>) -> Result<usize> {
        let mut patterns = vec![
            format!("{}:*", entity),
            format!("{}s:*", entity),
            "dashboard:*".to_string(),
            "stats:*".to_string(),
        ];
        if let Some(id) = id {
            patterns.push(format!("{}:{}:*", entity, id));
        }

        let mut removed = 0;
        for pattern in &patterns {
            removed += self.invalidate(Some(pattern))?;
        }
        Ok(removed)
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Number of fetches currently in flight.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// The underlying cache.
    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }

    pub fn spawn_sweeper(&self, interval: Duration) -> SweepHandle {
        self.cache.spawn_sweeper(interval)
    }
}

impl fmt::Debug for RemoteCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCache")
            .field("cache", &self.cache)
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// Removes a key's pending handle when dropped, so a fetch that panics or
/// is never started cannot leave the key stuck.
struct Registration {
    key: String,
    pending: PendingMap,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.key);
    }
}

/// Runs one fetch to completion, caches a success, unregisters it, then
/// hands the outcome to every waiter.
async fn settle<T, Fut>(
    registration: Registration,
    fetching: Fut,
    cache: TtlCache<Value>,
    ttl: Option<Duration>,
    sender: oneshot::Sender<Result<Value>>,
) where
    T: Serialize,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let key = registration.key.clone();
    let outcome = match fetching.await {
        Ok(data) => serde_json::to_value(data).map_err(CacheError::from),
        Err(err) => Err(CacheError::Fetch(Arc::new(err))),
    };

    match &outcome {
        Ok(value) => {
            cache.set(key.as_str(), value.clone(), ttl);
            debug!(key = %key, "Fetched and cached");
        }
        Err(err) => warn!(key = %key, error = %err, "Fetch failed"),
    }

    drop(registration);
    // Every waiter may have gone away
    let _ = sender.send(outcome);
}
