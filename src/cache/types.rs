use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// A cached value plus its TTL bookkeeping. Recency order is kept by the store.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    expires_at: Instant,
    last_accessed_at: Instant,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, created_at: Instant, expires_at: Instant) -> Self {
        Self {
            value,
            created_at,
            expires_at,
            last_accessed_at: created_at,
        }
    }

    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    #[inline]
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    #[inline]
    pub fn last_accessed_at(&self) -> Instant {
        self.last_accessed_at
    }

    #[inline]
    pub fn ttl(&self) -> Duration {
        self.expires_at.saturating_duration_since(self.created_at)
    }

    /// An entry is expired strictly after `expires_at`.
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    pub(crate) fn touch(&mut self, now: Instant) {
        self.last_accessed_at = now;
    }
}

/// Internal cache failure. Logged and absorbed; callers only ever observe a miss.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheFault {
    #[error("ttl of {ttl:?} overflows the clock")]
    ExpiryOverflow { ttl: Duration },

    #[error("cache has zero capacity")]
    ZeroCapacity,
}

/// Point-in-time counters of a [`super::CacheStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Entries dropped because they were found expired.
    pub expirations: u64,
    /// Absorbed [`CacheFault`]s.
    pub faults: u64,
    pub current_size: usize,
    pub max_size: usize,
}

impl CacheStats {
    /// Hits over lookups, `0.0` before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}
