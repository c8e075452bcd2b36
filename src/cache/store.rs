//! Bounded in-memory store with TTL expiry and LRU eviction.
//!
//! All state sits behind one [`parking_lot::RwLock`] around an [`lru::LruCache`]. Lookups that
//! refresh recency take the write lock; [`CacheStore::peek`], [`CacheStore::contains`] and the
//! size queries only read. No lock is ever held across an `.await`:
//! [`CacheStore::get_or_compute`] releases the lock before running the compute future and
//! re-acquires it to store the result.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use super::types::{CacheEntry, CacheFault, CacheStats};
use crate::constants::{DEFAULT_CACHE_MAX_SIZE, DEFAULT_CACHE_TTL};
use crate::hashing::CacheKey;

struct StoreInner<V> {
    entries: LruCache<CacheKey, CacheEntry<V>>,
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
    faults: u64,
}

impl<V> StoreInner<V> {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
            expirations: 0,
            faults: 0,
        }
    }
}

/// In-memory TTL + LRU cache keyed by [`CacheKey`].
pub struct CacheStore<V> {
    inner: RwLock<StoreInner<V>>,
    max_size: usize,
    default_ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    /// Creates a store with the default capacity and TTL.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_MAX_SIZE, DEFAULT_CACHE_TTL)
    }

    /// Creates a store holding at most `max_size` entries, each living `default_ttl`.
    ///
    /// A `max_size` of zero yields a store that refuses every write.
    pub fn with_config(max_size: usize, default_ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: RwLock::new(StoreInner::new(capacity)),
            max_size,
            default_ttl,
        }
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[inline]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns a live value and marks it most recently used.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = Instant::now();
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let Some(entry) = inner.entries.get_mut(key) else {
            inner.misses += 1;
            return None;
        };

        if entry.is_expired_at(now) {
            inner.entries.pop(key);
            inner.expirations += 1;
            inner.misses += 1;
            debug!(key = ?key, "Dropped expired entry");
            return None;
        }

        entry.touch(now);
        let value = entry.value().clone();
        inner.hits += 1;

        Some(value)
    }

    /// Returns a live value without touching recency or counters.
    pub fn peek(&self, key: &CacheKey) -> Option<V> {
        let now = Instant::now();
        self.inner
            .read()
            .entries
            .peek(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value().clone())
    }

    /// Stores `value` for `ttl`, evicting the least recently used entry when full.
    ///
    /// Returns `false` when an internal fault prevented the write; the fault is logged.
    pub fn insert(&self, key: CacheKey, value: V, ttl: Duration) -> bool {
        match self.try_insert(key, value, ttl) {
            Ok(()) => true,
            Err(fault) => {
                self.inner.write().faults += 1;
                warn!(key = ?key, error = %fault, "Cache write skipped");
                false
            }
        }
    }

    fn try_insert(&self, key: CacheKey, value: V, ttl: Duration) -> Result<(), CacheFault> {
        if self.max_size == 0 {
            return Err(CacheFault::ZeroCapacity);
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .ok_or(CacheFault::ExpiryOverflow { ttl })?;

        let mut inner = self.inner.write();

        // A concurrent miss may have stored the key already; `push` then replaces it in place.
        if let Some((evicted, _)) = inner
            .entries
            .push(key, CacheEntry::new(value, now, expires_at))
            && evicted != key
        {
            inner.evictions += 1;
            debug!(key = ?evicted, "Evicted least recently used entry");
        }

        Ok(())
    }

    /// Returns the cached value for `key`, or runs `compute` and caches its result.
    ///
    /// The boolean is `true` on a cache hit. A failed `compute` writes nothing and its error
    /// is returned unchanged.
    #[instrument(skip(self, compute), fields(key = ?key, ttl_secs = ttl.as_secs()))]
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<(V, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!("Cache hit");
            return Ok((value, true));
        }

        debug!("Cache miss, computing");
        let value = compute().await?;
        self.insert(*key, value.clone(), ttl);

        Ok((value, false))
    }

    /// Removes an entry, returning its value if it was present (expired or not).
    pub fn remove(&self, key: &CacheKey) -> Option<V> {
        self.inner
            .write()
            .entries
            .pop(key)
            .map(|entry| entry.value().clone())
    }

    /// Returns `true` if a live entry exists for `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        let now = Instant::now();
        self.inner
            .read()
            .entries
            .peek(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    /// Eagerly drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.write();

        let expired: Vec<CacheKey> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| *key)
            .collect();

        for key in &expired {
            inner.entries.pop(key);
        }
        inner.expirations += expired.len() as u64;

        if !expired.is_empty() {
            debug!(purged = expired.len(), "Purged expired entries");
        }
        expired.len()
    }

    /// Number of stored entries, including expired ones not yet touched.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Drops all entries. Counters are kept.
    pub fn clear(&self) {
        self.inner.write().entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.read();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            expirations: inner.expirations,
            faults: inner.faults,
            current_size: inner.entries.len(),
            max_size: self.max_size,
        }
    }
}

impl<V: Clone> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.inner.read().entries.len())
            .field("max_size", &self.max_size)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

/// Shared handle to a [`CacheStore`].
pub struct CacheStoreHandle<V> {
    inner: Arc<CacheStore<V>>,
}

impl<V> Clone for CacheStoreHandle<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone> CacheStoreHandle<V> {
    /// Creates a handle with default capacity and TTL.
    #[inline]
    pub fn new() -> Self {
        Self::from_store(CacheStore::new())
    }

    #[inline]
    pub fn with_config(max_size: usize, default_ttl: Duration) -> Self {
        Self::from_store(CacheStore::with_config(max_size, default_ttl))
    }

    #[inline]
    pub fn from_store(store: CacheStore<V>) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    #[inline]
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.inner.get(key)
    }

    #[inline]
    pub fn peek(&self, key: &CacheKey) -> Option<V> {
        self.inner.peek(key)
    }

    #[inline]
    pub fn insert(&self, key: CacheKey, value: V, ttl: Duration) -> bool {
        self.inner.insert(key, value, ttl)
    }

    #[inline]
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<(V, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.inner.get_or_compute(key, ttl, compute).await
    }

    #[inline]
    pub fn remove(&self, key: &CacheKey) -> Option<V> {
        self.inner.remove(key)
    }

    #[inline]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner.contains(key)
    }

    #[inline]
    pub fn purge_expired(&self) -> usize {
        self.inner.purge_expired()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn clear(&self) {
        self.inner.clear();
    }

    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    #[inline]
    pub fn default_ttl(&self) -> Duration {
        self.inner.default_ttl()
    }

    /// Returns the number of strong references to the underlying store.
    #[inline]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<V: Clone> Default for CacheStoreHandle<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for CacheStoreHandle<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStoreHandle")
            .field("strong_count", &Arc::strong_count(&self.inner))
            .finish()
    }
}
