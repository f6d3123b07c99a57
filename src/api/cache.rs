//! Query cache with tag invalidation
//!
//! Responses are cached per endpoint and parameter identity:
//! - identical concurrent queries share one in-flight request
//! - entries expire after a TTL and are evicted least-recently-used first
//! - mutations invalidate entries by the tags they provided
//! - a fetch that started before an invalidation is not stored

use super::endpoints::{CacheTag, Endpoint, PathParams};
use super::errors::ApiError;
use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use serde::Serialize;
use serde_json::Value;
use std::{
    collections::{BTreeMap, HashMap},
    future::Future,
    num::NonZeroUsize,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::{Duration, Instant},
};

/// Cleanup period used when the requested one is zero
const FALLBACK_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

type SharedFetch = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

/// Cache entry with metadata
struct CacheEntry {
    value: Value,
    tags: Vec<CacheTag>,
    created_at: Instant,
    access_count: u64,
}

struct InFlight {
    id: u64,
    tags: Vec<CacheTag>,
    fetch: SharedFetch,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Canonical cache key for an endpoint call
pub fn cache_key(endpoint: &Endpoint, params: &PathParams<'_>, query: &[(String, String)]) -> String {
    let params: BTreeMap<&str, &str> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let query: BTreeMap<&str, &str> = query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let identity = serde_json::json!({ "path": params, "query": query });
    format!("{}{}", endpoint.name, identity)
}

/// Shared response cache for every query endpoint
pub struct QueryCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    in_flight: Mutex<HashMap<String, InFlight>>,
    ttl: Duration,
    capacity: usize,
    /// Bumped on every invalidation
    epoch: AtomicU64,
    next_fetch_id: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN))),
            in_flight: Mutex::new(HashMap::new()),
            ttl,
            capacity,
            epoch: AtomicU64::new(0),
            next_fetch_id: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key`, or run `fetch` once for every
    /// concurrent caller and cache its successful result under `tags`.
    pub async fn query<F, Fut>(&self, key: String, tags: Vec<CacheTag>, fetch: F) -> Result<Value, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ApiError>> + Send + 'static,
    {
        if let Some(value) = self.get_fresh(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let epoch = self.epoch.load(Ordering::SeqCst);
        let (fetch_id, shared) = {
            let mut in_flight = lock(&self.in_flight);
            match in_flight.get(&key) {
                Some(pending) => {
                    tracing::debug!("Joining in-flight query {}", key);
                    (pending.id, pending.fetch.clone())
                }
                None => {
                    let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                    let shared = fetch().boxed().shared();
                    in_flight.insert(
                        key.clone(),
                        InFlight {
                            id,
                            tags: tags.clone(),
                            fetch: shared.clone(),
                        },
                    );
                    (id, shared)
                }
            }
        };

        let result = shared.await;

        {
            let mut in_flight = lock(&self.in_flight);
            if in_flight.get(&key).map(|p| p.id) == Some(fetch_id) {
                in_flight.remove(&key);
            }
        }

        if let Ok(value) = &result {
            if self.epoch.load(Ordering::SeqCst) == epoch {
                self.put(key, value.clone(), tags);
            }
        }

        result
    }

    /// Drop every entry that provided a tag matched by `tags`
    pub fn invalidate(&self, tags: &[CacheTag]) -> usize {
        if tags.is_empty() {
            return 0;
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);

        let matches = |provided: &[CacheTag]| tags.iter().any(|t| provided.iter().any(|p| t.matches(p)));

        let removed = {
            let mut entries = lock(&self.entries);
            let stale: Vec<String> = entries
                .iter()
                .filter(|(_, entry)| matches(&entry.tags))
                .map(|(key, _)| key.clone())
                .collect();
            for key in &stale {
                entries.pop(key);
            }
            stale.len()
        };

        lock(&self.in_flight).retain(|_, pending| !matches(&pending.tags));

        if removed > 0 {
            let names: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
            tracing::debug!("Invalidated {} cached queries for [{}]", removed, names.join(", "));
        }
        removed
    }

    /// Remove all entries
    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        lock(&self.entries).clear();
        lock(&self.in_flight).clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.entries).contains(key)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let entries = lock(&self.entries);
        let now = Instant::now();

        let mut total_access_count = 0;
        let mut expired_count = 0;
        for (_, entry) in entries.iter() {
            total_access_count += entry.access_count;
            if now.duration_since(entry.created_at) > self.ttl {
                expired_count += 1;
            }
        }

        CacheStats {
            capacity: self.capacity,
            size: entries.len(),
            expired_entries: expired_count,
            total_access_count,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            in_flight: lock(&self.in_flight).len(),
        }
    }

    /// Clean up expired entries
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = lock(&self.entries);
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.created_at) > self.ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(cache: Arc<QueryCache>, every: Duration) -> tokio::task::JoinHandle<()> {
        let every = if every.is_zero() { FALLBACK_CLEANUP_INTERVAL } else { every };
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = cache.cleanup_expired();
                if removed > 0 {
                    tracing::debug!("Cache cleanup: removed {} expired queries", removed);
                }
            }
        })
    }

    fn get_fresh(&self, key: &str) -> Option<Value> {
        let mut entries = lock(&self.entries);
        let expired = {
            let entry = entries.get_mut(key)?;
            if entry.created_at.elapsed() > self.ttl {
                true
            } else {
                entry.access_count += 1;
                return Some(entry.value.clone());
            }
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    fn put(&self, key: String, value: Value, tags: Vec<CacheTag>) {
        let entry = CacheEntry {
            value,
            tags,
            created_at: Instant::now(),
            access_count: 0,
        };
        lock(&self.entries).put(key, entry);
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub capacity: usize,
    pub size: usize,
    pub expired_entries: usize,
    pub total_access_count: u64,
    pub hits: u64,
    pub misses: u64,
    pub in_flight: usize,
}
