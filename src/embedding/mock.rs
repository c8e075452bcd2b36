//! Scripted gateway for tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;

use super::error::GatewayError;
use super::gateway::EmbeddingGateway;
use super::stub::pseudo_embedding;

const MOCK_DIM: usize = 8;

#[derive(Default)]
struct MockState {
    vectors: HashMap<String, Vec<f32>>,
    queued_failures: HashMap<String, VecDeque<GatewayError>>,
    permanent_failures: HashMap<String, GatewayError>,
    hanging: HashSet<String>,
    delay: Option<Duration>,
    calls: HashMap<String, usize>,
}

/// In-memory [`EmbeddingGateway`] with programmable failures, latency and hangs.
///
/// Texts are matched exactly (no normalization). Texts without a registered vector get a
/// deterministic pseudo-embedding.
#[derive(Default)]
pub struct MockEmbeddingGateway {
    state: Mutex<MockState>,
}

enum Scripted {
    Hang,
    Respond {
        delay: Option<Duration>,
        outcome: Result<Vec<f32>, GatewayError>,
    },
}

impl MockEmbeddingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the vector returned for `text`.
    pub fn with_vector(self, text: &str, vector: Vec<f32>) -> Self {
        self.state.lock().vectors.insert(text.to_string(), vector);
        self
    }

    /// Replaces the vector returned for `text` on later calls.
    pub fn set_vector(&self, text: &str, vector: Vec<f32>) {
        self.state.lock().vectors.insert(text.to_string(), vector);
    }

    /// Adds latency to every call.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().delay = Some(delay);
        self
    }

    /// Makes the next `times` calls for `text` fail with `error`.
    pub fn fail_next(&self, text: &str, error: GatewayError, times: usize) {
        let mut state = self.state.lock();
        let queue = state.queued_failures.entry(text.to_string()).or_default();
        queue.extend(std::iter::repeat_n(error, times));
    }

    /// Makes every call for `text` fail with `error`.
    pub fn fail_always(&self, text: &str, error: GatewayError) {
        self.state
            .lock()
            .permanent_failures
            .insert(text.to_string(), error);
    }

    /// Makes calls for `text` never complete.
    pub fn hang_on(&self, text: &str) {
        self.state.lock().hanging.insert(text.to_string());
    }

    /// Number of `embed` calls seen for `text`.
    pub fn calls(&self, text: &str) -> usize {
        self.state.lock().calls.get(text).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().calls.values().sum()
    }

    fn script(&self, text: &str) -> Scripted {
        let mut state = self.state.lock();
        *state.calls.entry(text.to_string()).or_default() += 1;

        if state.hanging.contains(text) {
            return Scripted::Hang;
        }

        let delay = state.delay;
        let outcome = if let Some(err) = state
            .queued_failures
            .get_mut(text)
            .and_then(VecDeque::pop_front)
        {
            Err(err)
        } else if let Some(err) = state.permanent_failures.get(text) {
            Err(err.clone())
        } else {
            Ok(state
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| pseudo_embedding(text, MOCK_DIM)))
        };

        Scripted::Respond { delay, outcome }
    }
}

impl EmbeddingGateway for MockEmbeddingGateway {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        match self.script(text) {
            Scripted::Hang => std::future::pending().await,
            Scripted::Respond { delay, outcome } => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                outcome
            }
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

impl std::fmt::Debug for MockEmbeddingGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockEmbeddingGateway")
            .field("total_calls", &self.total_calls())
            .finish()
    }
}
