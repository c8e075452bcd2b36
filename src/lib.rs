//! Matchscore library crate (used by the CLI and integration tests).
//!
//! Scores a candidate text against a target text: embedding similarity stretched by a
//! sigmoid, plus whole-word keyword coverage.
//!
//! # Public API Surface
//!
//! ## Entry Point
//! - [`ScoringOrchestrator`] - One scoring request end to end, plus statistics
//! - [`Config`], [`ConfigError`] - Engine settings from `MATCHSCORE_*` variables
//!
//! ## Caching
//! - [`CacheStore`], [`CacheStoreHandle`] - TTL + LRU store with fault-absorbing writes
//! - [`CacheKey`], [`CacheKind`] - Namespaced BLAKE3 keys over normalized text
//!
//! ## Embeddings
//! - [`EmbeddingGateway`] - Boundary to the vector provider
//! - [`HttpEmbeddingGateway`], [`StubEmbeddingGateway`] - Network and offline gateways
//! - [`ConcurrentEmbeddingFetcher`], [`RetryPolicy`] - Cached pair fetch with backoff
//!
//! ## Scoring
//! - [`SimilarityScorer`] - Cosine similarity and the guarded sigmoid
//! - [`KeywordCoverageAnalyzer`] - Keyword partition over markup-stripped text
//!
//! ## Test/Mock Support
//! [`MockEmbeddingGateway`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod hashing;
pub mod scoring;

pub use cache::{CacheEntry, CacheFault, CacheStats, CacheStore, CacheStoreHandle};
pub use config::{Config, ConfigError};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbeddingGateway;
pub use embedding::{
    ConcurrentEmbeddingFetcher, Embedding, EmbeddingGateway, FetchError, FetchedPair,
    GatewayError, HttpEmbeddingGateway, HttpGatewayConfig, RetryPolicy, StubEmbeddingGateway,
};
pub use hashing::{CacheKey, CacheKind, normalize_text};
pub use scoring::{
    CacheStatistics, KeywordCoverage, KeywordCoverageAnalyzer, ScoreResult, ScoringError,
    ScoringOrchestrator, SigmoidParams, SimilarityScorer, cosine_similarity, sigmoid_transform,
};
