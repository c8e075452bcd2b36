//! Offline gateway producing deterministic pseudo-embeddings.
//!
//! Vectors are seeded from the BLAKE3 hash of the normalized text, so equivalent texts embed
//! identically. Similarities between unrelated texts are close to zero; this is only useful
//! for wiring checks and local runs without an embeddings endpoint.

use tracing::debug;

use super::error::GatewayError;
use super::gateway::EmbeddingGateway;
use crate::constants::DEFAULT_EMBEDDING_DIM;
use crate::hashing::normalize_text;

#[derive(Debug, Clone, Copy)]
pub struct StubEmbeddingGateway {
    dim: usize,
}

impl StubEmbeddingGateway {
    pub fn new() -> Self {
        Self::with_dim(DEFAULT_EMBEDDING_DIM)
    }

    pub fn with_dim(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embedding_dim(&self) -> usize {
        self.dim
    }

    /// Synchronous form of [`EmbeddingGateway::embed`].
    pub fn embed_sync(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        let normalized = normalize_text(text);
        if normalized.is_empty() {
            return Err(GatewayError::InvalidInput {
                reason: "text is empty".to_string(),
            });
        }

        debug!(text_len = text.len(), "Generating stub embedding");
        Ok(pseudo_embedding(&normalized, self.dim))
    }
}

impl Default for StubEmbeddingGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingGateway for StubEmbeddingGateway {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        self.embed_sync(text)
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Unit-length vector derived from `seed_text` with a 64-bit LCG.
pub(crate) fn pseudo_embedding(seed_text: &str, dim: usize) -> Vec<f32> {
    let digest = blake3::hash(seed_text.as_bytes());
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest.as_bytes()[..8]);
    let mut state = u64::from_le_bytes(seed);

    let mut embedding: Vec<f32> = (0..dim)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
        })
        .collect();

    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut embedding {
            *x /= norm;
        }
    }
    embedding
}
