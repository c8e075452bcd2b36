//! Concurrent, cache-backed retrieval of a pair of embeddings.
//!
//! Both texts are resolved at once with `tokio::try_join!`: the first error drops (and so
//! cancels) the sibling future, and the whole pair is bounded by one deadline. Nothing is
//! spawned, so no fetch outlives the call.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, instrument};

use super::error::{FetchError, GatewayError};
use super::gateway::EmbeddingGateway;
use super::retry::RetryPolicy;
use crate::cache::CacheStoreHandle;
use crate::constants::{DEFAULT_CACHE_TTL, DEFAULT_EMBEDDING_TIMEOUT};
use crate::hashing::{CacheKey, CacheKind};

/// Shared, immutable embedding vector.
pub type Embedding = Arc<[f32]>;

/// Two resolved embeddings and where each one came from.
#[derive(Debug, Clone)]
pub struct FetchedPair {
    pub first: Embedding,
    pub second: Embedding,
    pub first_cached: bool,
    pub second_cached: bool,
}

impl FetchedPair {
    /// `true` only when both vectors were served from cache.
    #[inline]
    pub fn both_cached(&self) -> bool {
        self.first_cached && self.second_cached
    }
}

/// Resolves embeddings through a lookaside cache, calling the gateway on misses.
pub struct ConcurrentEmbeddingFetcher<G: EmbeddingGateway> {
    gateway: G,
    cache: CacheStoreHandle<Embedding>,
    ttl: Duration,
    retry: RetryPolicy,
    deadline: Duration,
}

impl<G: EmbeddingGateway> std::fmt::Debug for ConcurrentEmbeddingFetcher<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentEmbeddingFetcher")
            .field("gateway", &self.gateway.name())
            .field("cache", &self.cache)
            .field("ttl", &self.ttl)
            .field("retry", &self.retry)
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl<G: EmbeddingGateway> ConcurrentEmbeddingFetcher<G> {
    pub fn new(gateway: G, cache: CacheStoreHandle<Embedding>) -> Self {
        Self {
            gateway,
            cache,
            ttl: DEFAULT_CACHE_TTL,
            retry: RetryPolicy::default(),
            deadline: DEFAULT_EMBEDDING_TIMEOUT,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Deadline for a whole [`Self::fetch_pair`] call, retries and backoff included.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn cache(&self) -> &CacheStoreHandle<Embedding> {
        &self.cache
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Fetches both embeddings concurrently. All-or-nothing: any failure fails the pair.
    #[instrument(
        skip(self, first, second),
        fields(gateway = self.gateway.name(), first_len = first.len(), second_len = second.len())
    )]
    pub async fn fetch_pair(&self, first: &str, second: &str) -> Result<FetchedPair, FetchError> {
        let first_key = CacheKey::new(CacheKind::Embedding, first);
        let second_key = CacheKey::new(CacheKind::Embedding, second);

        let fetches = async {
            if first_key == second_key {
                // Equivalent texts: one lookup serves both sides.
                let (vector, cached) = self.fetch_keyed(&first_key, first).await?;
                Ok::<_, FetchError>(((Arc::clone(&vector), cached), (vector, cached)))
            } else {
                tokio::try_join!(
                    self.fetch_keyed(&first_key, first),
                    self.fetch_keyed(&second_key, second)
                )
            }
        };

        let ((first, first_cached), (second, second_cached)) =
            match timeout(self.deadline, fetches).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(FetchError::DeadlineExceeded {
                        timeout: self.deadline,
                    });
                }
            };

        debug!(first_cached, second_cached, "Fetched embedding pair");

        Ok(FetchedPair {
            first,
            second,
            first_cached,
            second_cached,
        })
    }

    /// Fetches one embedding through the cache. Returns the vector and whether it was cached.
    pub async fn fetch(&self, text: &str) -> Result<(Embedding, bool), FetchError> {
        let key = CacheKey::new(CacheKind::Embedding, text);
        match timeout(self.deadline, self.fetch_keyed(&key, text)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::DeadlineExceeded {
                timeout: self.deadline,
            }),
        }
    }

    async fn fetch_keyed(
        &self,
        key: &CacheKey,
        text: &str,
    ) -> Result<(Embedding, bool), FetchError> {
        self.cache
            .get_or_compute(key, self.ttl, || self.embed_with_retry(text))
            .await
    }

    async fn embed_with_retry(&self, text: &str) -> Result<Embedding, FetchError> {
        self.retry
            .run("embed", || async move {
                let vector = self.gateway.embed(text).await?;
                validate_embedding(&vector)?;
                Ok::<_, GatewayError>(Embedding::from(vector))
            })
            .await
    }
}

fn validate_embedding(vector: &[f32]) -> Result<(), GatewayError> {
    if vector.is_empty() {
        return Err(GatewayError::ServiceUnavailable {
            reason: "gateway returned an empty embedding".to_string(),
        });
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(GatewayError::ServiceUnavailable {
            reason: "gateway returned a non-finite embedding component".to_string(),
        });
    }
    Ok(())
}
