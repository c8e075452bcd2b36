//! Match scoring: similarity, keyword coverage, and the orchestrator tying them together.
//!
//! [`ScoringOrchestrator::score`] runs one request:
//!
//! 1. Both embeddings are resolved concurrently through the cache
//!    ([`ConcurrentEmbeddingFetcher`](crate::embedding::ConcurrentEmbeddingFetcher)).
//! 2. [`SimilarityScorer`] computes cosine similarity and its sigmoid stretch.
//! 3. [`KeywordCoverageAnalyzer`] checks the keywords against the candidate text.
//!
//! Numeric faults never fail a request. They resolve to bounded fallback values.

pub mod error;
pub mod keywords;
pub mod orchestrator;
pub mod similarity;
pub mod stats;
pub mod types;


pub use error::ScoringError;
pub use keywords::{KeywordCoverageAnalyzer, contains_whole_word, strip_markup};
pub use orchestrator::ScoringOrchestrator;
pub use similarity::{
    SigmoidParams, SimilarityScore, SimilarityScorer, cosine_similarity, sigmoid_transform,
};
pub use stats::{CacheStatistics, ScoreStats};
pub use types::{KeywordCoverage, ScoreResult, coverage_percent};
