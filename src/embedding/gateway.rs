use std::future::Future;
use std::sync::Arc;

use super::error::GatewayError;

/// Turns text into a fixed-length vector.
pub trait EmbeddingGateway: Send + Sync {
    /// Embeds one text. Transient failures are reported, never retried here.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, GatewayError>> + Send;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

impl<G: EmbeddingGateway> EmbeddingGateway for Arc<G> {
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, GatewayError>> + Send {
        (**self).embed(text)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
