//! One scoring request from texts to [`ScoreResult`].

use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::error::ScoringError;
use super::keywords::KeywordCoverageAnalyzer;
use super::similarity::SimilarityScorer;
use super::stats::{CacheStatistics, ScoreStats};
use super::types::ScoreResult;
use crate::cache::CacheStoreHandle;
use crate::config::Config;
use crate::embedding::{ConcurrentEmbeddingFetcher, Embedding, EmbeddingGateway};

/// Composes fetching, similarity, and keyword coverage, and keeps request statistics.
///
/// Similarity is always computed from the vectors the fetcher just returned, so a re-fetched
/// embedding is never paired with a score derived from its predecessor.
pub struct ScoringOrchestrator<G: EmbeddingGateway> {
    fetcher: ConcurrentEmbeddingFetcher<G>,
    scorer: SimilarityScorer,
    analyzer: KeywordCoverageAnalyzer,
    stats: ScoreStats,
}

impl<G: EmbeddingGateway> std::fmt::Debug for ScoringOrchestrator<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringOrchestrator")
            .field("fetcher", &self.fetcher)
            .field("scorer", &self.scorer)
            .finish_non_exhaustive()
    }
}

impl<G: EmbeddingGateway> ScoringOrchestrator<G> {
    /// Builds an orchestrator with default settings.
    pub fn new(gateway: G) -> Self {
        Self::from_config(gateway, &Config::default())
    }

    /// Builds an orchestrator from `config`. Call [`Config::validate`] first.
    pub fn from_config(gateway: G, config: &Config) -> Self {
        let embeddings = CacheStoreHandle::with_config(config.cache_max_size, config.cache_ttl);

        let fetcher = ConcurrentEmbeddingFetcher::new(gateway, embeddings)
            .with_ttl(config.cache_ttl)
            .with_retry(config.retry_policy())
            .with_deadline(config.embedding_timeout);

        info!(
            gateway = fetcher.gateway().name(),
            cache_max_size = config.cache_max_size,
            cache_ttl_secs = config.cache_ttl.as_secs(),
            sigmoid_x0 = config.sigmoid_x0,
            sigmoid_k = config.sigmoid_k,
            "Scoring orchestrator ready"
        );

        Self {
            fetcher,
            scorer: SimilarityScorer::new(config.sigmoid_params()),
            analyzer: KeywordCoverageAnalyzer::new(),
            stats: ScoreStats::new(),
        }
    }

    /// Scores `candidate` against `target` and checks `keywords` against `candidate`.
    ///
    /// Only terminal embedding failures are returned as errors; no partial result is
    /// produced in that case.
    #[instrument(
        skip(self, candidate, target, keywords),
        fields(candidate_len = candidate.len(), target_len = target.len(), keywords = keywords.len())
    )]
    pub async fn score<S: AsRef<str>>(
        &self,
        candidate: &str,
        target: &str,
        keywords: &[S],
    ) -> Result<ScoreResult, ScoringError> {
        let started = Instant::now();

        let pair = match self.fetcher.fetch_pair(candidate, target).await {
            Ok(pair) => pair,
            Err(e) => {
                self.stats.record_failure();
                warn!(error = %e, "Scoring request failed");
                return Err(e.into());
            }
        };

        let raw_similarity = self.scorer.cosine_similarity(&pair.first, &pair.second);
        let transformed_similarity = self.scorer.transform(raw_similarity);
        let keyword_coverage = self.analyzer.analyze(candidate, keywords);
        let cache_hit = pair.both_cached();

        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.stats.record_success(processing_time_ms, cache_hit);

        debug!(
            raw_similarity,
            transformed_similarity,
            coverage_percent = keyword_coverage.coverage_percent,
            cache_hit,
            processing_time_ms,
            "Scored pair"
        );

        Ok(ScoreResult {
            raw_similarity,
            transformed_similarity,
            keyword_coverage,
            cache_hit,
            processing_time_ms,
        })
    }

    /// Current embedding cache counters plus request statistics.
    pub fn statistics(&self) -> CacheStatistics {
        self.stats.snapshot(self.fetcher.cache().stats())
    }

    /// Drops expired embeddings. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.fetcher.cache().purge_expired()
    }

    /// Empties the embedding cache. Statistics are kept.
    pub fn clear_cache(&self) {
        self.fetcher.cache().clear();
    }

    pub fn embedding_cache(&self) -> &CacheStoreHandle<Embedding> {
        self.fetcher.cache()
    }

    pub fn fetcher(&self) -> &ConcurrentEmbeddingFetcher<G> {
        &self.fetcher
    }

    pub fn scorer(&self) -> &SimilarityScorer {
        &self.scorer
    }

    pub fn gateway(&self) -> &G {
        self.fetcher.gateway()
    }
}
