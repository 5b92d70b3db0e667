//! Stale-while-revalidate fetching
//!
//! A hit returns the cached value at once and refreshes the entry in a
//! detached task; a miss fetches, stores and returns. Background refreshes
//! cannot be cancelled, and whichever fetch finishes last wins the slot.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};

use super::invalidation::DAY_SCOPED_PATTERNS;
use super::key::cache_key;
use super::policy::resolve_ttl;
use super::store::CacheStore;
use crate::client::query::QueryParams;
use crate::error::Result;

/// Identity and lifetime of a cacheable request
#[derive(Debug, Clone)]
pub struct CacheRequest {
    pub endpoint: String,
    pub method: Method,
    pub params: QueryParams,
    /// Overrides the policy-selected TTL
    pub ttl: Option<Duration>,
}

impl CacheRequest {
    pub fn get(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            method: Method::GET,
            params: QueryParams::new(),
            ttl: None,
        }
    }

    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn key(&self) -> String {
        cache_key(&self.endpoint, &self.method, &self.params)
    }

    pub fn resolve_ttl(&self, today: NaiveDate) -> Duration {
        self.ttl
            .unwrap_or_else(|| resolve_ttl(&self.endpoint, &self.params, today))
    }
}

/// Serve from cache when fresh, refreshing in the background; fetch otherwise.
///
/// Errors from a background refresh are logged and dropped. Errors on a miss
/// propagate to the caller.
pub async fn cached_fetch<T, F, Fut>(
    store: &Arc<CacheStore>,
    request: &CacheRequest,
    fetch: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    store.roll_day(DAY_SCOPED_PATTERNS);

    let key = request.key();
    let ttl = request.resolve_ttl(store.clock().today());

    if let Some(cached) = store.get::<T>(&key) {
        log::debug!("Cache hit: {}", key);
        let store = Arc::clone(store);
        tokio::spawn(async move {
            match fetch().await {
                Ok(fresh) => store.set(&key, &fresh, ttl),
                Err(e) => log::debug!("Background refresh of {} failed: {}", key, e),
            }
        });
        return Ok(cached);
    }

    log::debug!("Cache miss: {}", key);
    let fresh = fetch().await?;
    store.set(&key, &fresh, ttl);
    Ok(fresh)
}

/// Skip the lookup, fetch and overwrite the cached entry
pub async fn fetch_fresh<T, F, Fut>(
    store: &CacheStore,
    request: &CacheRequest,
    fetch: F,
) -> Result<T>
where
    T: Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let key = request.key();
    let ttl = request.resolve_ttl(store.clock().today());
    let fresh = fetch().await?;
    store.set(&key, &fresh, ttl);
    Ok(fresh)
}
