use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Which keywords were found in a text.
pub struct KeywordCoverage {
    /// Keywords evaluated (empty entries excluded).
    pub total_keywords: usize,
    pub covered_count: usize,
    /// `covered_count / total_keywords * 100`, rounded half-up; `0` when there are no keywords.
    pub coverage_percent: u32,
    /// Found keywords, in input order.
    pub covered: Vec<String>,
    /// Missing keywords, in input order.
    pub missed: Vec<String>,
}

impl KeywordCoverage {
    /// Builds the coverage record from an already partitioned keyword list.
    pub fn from_partition(covered: Vec<String>, missed: Vec<String>) -> Self {
        let covered_count = covered.len();
        let total_keywords = covered_count + missed.len();

        Self {
            total_keywords,
            covered_count,
            coverage_percent: coverage_percent(covered_count, total_keywords),
            covered,
            missed,
        }
    }

    /// Returns `true` if no keywords were evaluated.
    pub fn is_empty(&self) -> bool {
        self.total_keywords == 0
    }
}

/// Integer percentage with round-half-up, computed without floating point.
pub fn coverage_percent(covered: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let covered = covered.min(total) as u64;
    let total = total as u64;
    ((covered * 200 + total) / (total * 2)) as u32
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Outcome of scoring one candidate text against one target text.
pub struct ScoreResult {
    /// Cosine similarity of the two embeddings, in `[0, 1]`.
    pub raw_similarity: f64,
    /// Sigmoid-transformed similarity, in `[0, 1]`.
    pub transformed_similarity: f64,
    pub keyword_coverage: KeywordCoverage,
    /// `true` only if both embeddings came from cache.
    pub cache_hit: bool,
    pub processing_time_ms: u64,
}

impl ScoreResult {
    /// `raw_similarity` as a percentage in `[0, 100]`.
    pub fn raw_similarity_percent(&self) -> f64 {
        (self.raw_similarity * 100.0).clamp(0.0, 100.0)
    }

    /// `transformed_similarity` as a percentage in `[0, 100]`.
    pub fn transformed_similarity_percent(&self) -> f64 {
        (self.transformed_similarity * 100.0).clamp(0.0, 100.0)
    }
}
