//! Client-side query cache.
//!
//! Entries are addressed by [`QueryKey`]: the entity path segments plus the
//! canonical query parameters. A read within the freshness window is served from
//! memory; identical reads that overlap in time share one request. Mutations
//! invalidate by key prefix, which is the only consistency mechanism: the next
//! read of an invalidated key refetches.
//!
//! There is no request cancellation. When two fetches for the same key complete
//! in sequence, the later one overwrites the earlier (last successful response wins).

use crate::api::paths;
use crate::errors::{Error, Result};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, trace};

/// Cache address: entity path segments plus sorted query parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    segments: Vec<String>,
    params: Vec<(String, String)>,
}

impl QueryKey {
    /// Key for a path without parameters (`members/42/balance-payments`).
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            segments: paths::segments(path),
            params: Vec::new(),
        }
    }

    /// Key for a path with parameters; parameter order does not matter.
    #[must_use]
    pub fn with_params(path: &str, params: &[(String, String)]) -> Self {
        let mut params = params.to_vec();
        params.sort();
        Self {
            segments: paths::segments(path),
            params,
        }
    }

    /// Path segments of the key
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Canonical parameters of the key
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// True when the key's path begins with every segment of `prefix`.
    #[must_use]
    pub fn has_prefix(&self, prefix: &[&str]) -> bool {
        prefix.len() <= self.segments.len()
            && prefix
                .iter()
                .zip(&self.segments)
                .all(|(expected, actual)| *expected == actual)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{name}={value}")?;
        }
        Ok(())
    }
}

type FetchOutput = std::result::Result<Arc<Value>, Arc<Error>>;
type InFlight = Shared<BoxFuture<'static, FetchOutput>>;

#[derive(Debug)]
struct CacheEntry {
    value: Arc<Value>,
    fetched_at: Instant,
    stale: bool,
}

struct Inner {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
    inflight: Mutex<HashMap<QueryKey, (u64, InFlight)>>,
    next_fetch_id: AtomicU64,
    generation: AtomicU64,
    stale_after: Duration,
}

/// Process-wide query cache, injected wherever lists are read or mutations run
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("stale_after", &self.inner.stale_after)
            .finish_non_exhaustive()
    }
}

impl QueryCache {
    /// Creates an empty cache whose entries stay fresh for `stale_after`.
    #[must_use]
    pub fn new(stale_after: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(HashMap::new()),
                inflight: Mutex::new(HashMap::new()),
                next_fetch_id: AtomicU64::new(0),
                generation: AtomicU64::new(0),
                stale_after,
            }),
        }
    }

    /// Cached value for `key` if it is still fresh.
    pub async fn fresh(&self, key: &QueryKey) -> Option<Arc<Value>> {
        let entries = self.inner.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.stale && entry.fetched_at.elapsed() < self.inner.stale_after)
            .map(|entry| Arc::clone(&entry.value))
    }

    /// Cached value for `key` regardless of freshness.
    pub async fn peek(&self, key: &QueryKey) -> Option<Arc<Value>> {
        let entries = self.inner.entries.read().await;
        entries.get(key).map(|entry| Arc::clone(&entry.value))
    }

    /// Returns the fresh cached value for `key`, or runs `fetcher` and caches its result.
    ///
    /// Concurrent calls for the same key while a fetch is in flight await that
    /// fetch instead of starting another; their own `fetcher` is dropped unpolled.
    /// Failures are not cached.
    pub async fn fetch<F>(&self, key: QueryKey, fetcher: F) -> Result<Arc<Value>>
    where
        F: Future<Output = Result<Value>> + Send + 'static,
    {
        if let Some(value) = self.fresh(&key).await {
            trace!(%key, "Query cache hit");
            return Ok(value);
        }

        let started_at_generation = self.inner.generation.load(Ordering::SeqCst);
        let (fetch_id, shared) = {
            let mut inflight = self.inner.inflight.lock().await;
            if let Some((id, existing)) = inflight.get(&key) {
                trace!(%key, "Joining in-flight query");
                (*id, existing.clone())
            } else {
                debug!(%key, "Query cache miss, fetching");
                let id = self.inner.next_fetch_id.fetch_add(1, Ordering::SeqCst);
                let shared = fetcher
                    .map(|result| result.map(Arc::new).map_err(Arc::new))
                    .boxed()
                    .shared();
                inflight.insert(key.clone(), (id, shared.clone()));
                (id, shared)
            }
        };

        let result = shared.await;

        let completed_here = {
            let mut inflight = self.inner.inflight.lock().await;
            let ours = inflight.get(&key).is_some_and(|(id, _)| *id == fetch_id);
            if ours {
                inflight.remove(&key);
            }
            ours
        };

        if completed_here {
            if let Ok(value) = &result {
                let stale = self.inner.generation.load(Ordering::SeqCst) != started_at_generation;
                if stale {
                    debug!(%key, "Cache invalidated during fetch; storing result as stale");
                }
                self.inner.entries.write().await.insert(
                    key,
                    CacheEntry {
                        value: Arc::clone(value),
                        fetched_at: Instant::now(),
                        stale,
                    },
                );
            }
        }

        result.map_err(|shared_err| Arc::try_unwrap(shared_err).unwrap_or_else(Error::Shared))
    }

    /// Drops every entry whose path starts with `prefix`; returns how many were dropped.
    pub async fn invalidate(&self, prefix: &[&str]) -> usize {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.inner.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.has_prefix(prefix));
        let dropped = before - entries.len();
        debug!(prefix = %prefix.join("/"), dropped, "Invalidated cached queries");
        dropped
    }

    /// Drops every entry, e.g. on sign-out.
    pub async fn clear(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.entries.write().await.clear();
    }

    /// Number of cached entries, fresh or not
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    /// True when nothing is cached
    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }
}
