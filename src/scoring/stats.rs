//! Process-lifetime request counters.

use parking_lot::Mutex;
use serde::Serialize;

use crate::cache::CacheStats;

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    requests: u64,
    full_cache_hits: u64,
    failed_requests: u64,
    scored_requests: u64,
    mean_processing_time_ms: f64,
}

/// Request-level counters shared by all scoring calls.
#[derive(Debug, Default)]
pub struct ScoreStats {
    counters: Mutex<Counters>,
}

impl ScoreStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful request and folds its latency into the running mean.
    pub fn record_success(&self, processing_time_ms: u64, cache_hit: bool) {
        let mut c = self.counters.lock();
        c.requests += 1;
        c.scored_requests += 1;
        if cache_hit {
            c.full_cache_hits += 1;
        }
        let n = c.scored_requests as f64;
        c.mean_processing_time_ms += (processing_time_ms as f64 - c.mean_processing_time_ms) / n;
    }

    pub fn record_failure(&self) {
        let mut c = self.counters.lock();
        c.requests += 1;
        c.failed_requests += 1;
    }

    /// Combines these counters with a snapshot of the embedding cache.
    pub fn snapshot(&self, cache: CacheStats) -> CacheStatistics {
        let c = *self.counters.lock();
        CacheStatistics {
            hits: cache.hits,
            misses: cache.misses,
            evictions: cache.evictions,
            current_size: cache.current_size,
            requests: c.requests,
            full_cache_hits: c.full_cache_hits,
            failed_requests: c.failed_requests,
            mean_processing_time_ms: c.mean_processing_time_ms,
        }
    }
}

/// Engine-wide statistics: embedding cache counters plus request latency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatistics {
    /// Embedding cache hits (one per text lookup).
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub current_size: usize,
    /// Scoring requests, failed ones included.
    pub requests: u64,
    /// Requests whose two embeddings both came from cache.
    pub full_cache_hits: u64,
    pub failed_requests: u64,
    /// Running mean over successful requests.
    pub mean_processing_time_ms: f64,
}

impl CacheStatistics {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}
