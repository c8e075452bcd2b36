//! Cosine similarity and the logistic score transform.
//!
//! Neither function can fail: numeric faults resolve to a bounded fallback value and are
//! logged, so a score computation never aborts a request.

use serde::Serialize;
use tracing::warn;

use crate::constants::{DEFAULT_SIGMOID_K, DEFAULT_SIGMOID_X0, SIGMOID_EXPONENT_LIMIT, SIGMOID_NEUTRAL};

/// Constants of `1 / (1 + exp(-k * (x - x0)))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SigmoidParams {
    /// Input that maps to 0.5.
    pub x0: f64,
    /// Steepness. Must be positive for the transform to be non-decreasing.
    pub k: f64,
}

impl Default for SigmoidParams {
    fn default() -> Self {
        Self {
            x0: DEFAULT_SIGMOID_X0,
            k: DEFAULT_SIGMOID_K,
        }
    }
}

impl SigmoidParams {
    pub fn new(x0: f64, k: f64) -> Self {
        Self { x0, k }
    }
}

/// Raw and transformed similarity of one vector pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScore {
    pub raw: f64,
    pub transformed: f64,
}

/// Cosine similarity clamped to `[0, 1]`.
///
/// Mismatched lengths, empty input and zero-norm vectors yield `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        warn!(
            left_dim = a.len(),
            right_dim = b.len(),
            "Embedding dimensions differ, similarity set to 0"
        );
        return 0.0;
    }
    if a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) =
        a.iter()
            .zip(b.iter())
            .fold((0.0f64, 0.0f64, 0.0f64), |(dot, na, nb), (&av, &bv)| {
                let av = f64::from(av);
                let bv = f64::from(bv);
                (dot + av * bv, na + av * av, nb + bv * bv)
            });

    let denom = norm_a_sq.sqrt() * norm_b_sq.sqrt();
    if denom == 0.0 {
        return 0.0;
    }

    let similarity = dot / denom;
    if !similarity.is_finite() {
        warn!("Non-finite cosine similarity, set to 0");
        return 0.0;
    }
    similarity.clamp(0.0, 1.0)
}

/// Logistic transform `1 / (1 + exp(-k * (x - x0)))`, bounded to `[0, 1]`.
///
/// Exponents beyond ±[`SIGMOID_EXPONENT_LIMIT`] short-circuit to `0.0` / `1.0`. Anything that
/// still fails to produce a finite value (NaN input or parameters) returns
/// [`SIGMOID_NEUTRAL`].
pub fn sigmoid_transform(x: f64, x0: f64, k: f64) -> f64 {
    let exponent = -k * (x - x0);

    if exponent.is_nan() {
        warn!(x, x0, k, "Sigmoid exponent is NaN, using neutral score");
        return SIGMOID_NEUTRAL;
    }
    if exponent > SIGMOID_EXPONENT_LIMIT {
        return 0.0;
    }
    if exponent < -SIGMOID_EXPONENT_LIMIT {
        return 1.0;
    }

    let value = 1.0 / (1.0 + exponent.exp());
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        warn!(x, x0, k, "Sigmoid produced a non-finite value, using neutral score");
        SIGMOID_NEUTRAL
    }
}

/// Computes cosine similarity and stretches it with a configured sigmoid.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityScorer {
    params: SigmoidParams,
}

impl SimilarityScorer {
    pub fn new(params: SigmoidParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> SigmoidParams {
        self.params
    }

    #[inline]
    pub fn cosine_similarity(&self, a: &[f32], b: &[f32]) -> f64 {
        cosine_similarity(a, b)
    }

    #[inline]
    pub fn transform(&self, raw: f64) -> f64 {
        sigmoid_transform(raw, self.params.x0, self.params.k)
    }

    pub fn score(&self, a: &[f32], b: &[f32]) -> SimilarityScore {
        let raw = self.cosine_similarity(a, b);
        SimilarityScore {
            raw,
            transformed: self.transform(raw),
        }
    }
}
