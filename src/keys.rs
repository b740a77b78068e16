//! Key and memoization helpers.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::remote::{FetchOptions, RemoteCache};

/// Builds `api:<method>:<endpoint>`, suffixed with `:<params as JSON>` when given.
pub fn generate_api_key(method: &str, endpoint: &str, params: Option<&Value>) -> String {
    match params {
        Some(params) => format!("api:{}:{}:{}", method, endpoint, params),
        None => format!("api:{}:{}", method, endpoint),
    }
}

/// Builds `entity:<entity>[:<id>][:<action>]`.
pub fn generate_entity_key(entity: &str, id: Option<&str>, action: Option<&str>) -> String {
    let mut key = format!("entity:{}", entity);
    for part in [id, action].into_iter().flatten() {
        key.push(':');
        key.push_str(part);
    }
    key
}

// == Cached ==
/// An async function memoized through a [`RemoteCache`].
///
/// Built by [`cached`]. Calls whose arguments produce the same key share a
/// cached result within the ttl window, and concurrent calls share one
/// invocation.
#[derive(Debug, Clone)]
pub struct Cached<F, K> {
    remote: RemoteCache,
    func: F,
    key_fn: K,
    ttl: Option<Duration>,
}

/// Wraps `func` so each call is routed through `remote` under the key
/// `key_fn` derives from its arguments. Multiple arguments are passed as a
/// tuple.
pub fn cached<F, K>(
    remote: &RemoteCache,
    func: F,
    key_fn: K,
    ttl: Option<Duration>,
) -> Cached<F, K> {
    Cached {
        remote: remote.clone(),
        func,
        key_fn,
        ttl,
    }
}

impl<F, K> Cached<F, K> {
    pub async fn call<A, T, Fut>(&self, args: A) -> Result<T>
    where
        F: Fn(A) -> Fut,
        K: Fn(&A) -> String,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        let key = (self.key_fn)(&args);
        let options = FetchOptions {
            ttl: self.ttl,
            force_refresh: false,
        };

        self.remote.get(&key, || (self.func)(args), options).await
    }
}
