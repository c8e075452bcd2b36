//! Embedding gateways and the concurrent, cached pair fetcher.
//!
//! - [`EmbeddingGateway`] is the boundary to whatever produces vectors.
//! - [`HttpEmbeddingGateway`] talks to an OpenAI-compatible endpoint; [`StubEmbeddingGateway`]
//!   runs offline.
//! - [`ConcurrentEmbeddingFetcher`] resolves two texts at once through the cache, retrying
//!   transient gateway failures with [`RetryPolicy`].

mod error;
/// Cache-backed concurrent pair fetcher.
pub mod fetcher;
/// Gateway trait.
pub mod gateway;
/// OpenAI-compatible HTTP gateway.
pub mod http;
/// Scripted gateway for tests.
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Backoff policy.
pub mod retry;
/// Deterministic offline gateway.
pub mod stub;


pub use error::{FetchError, GatewayError};
pub use fetcher::{ConcurrentEmbeddingFetcher, Embedding, FetchedPair};
pub use gateway::EmbeddingGateway;
pub use http::{HttpEmbeddingGateway, HttpGatewayConfig};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbeddingGateway;
pub use retry::RetryPolicy;
pub use stub::StubEmbeddingGateway;
