//! Exponential backoff for transient gateway failures.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use tokio::time::sleep;
use tracing::{info, warn};

use super::error::{FetchError, GatewayError};
use crate::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_RETRY_MAX_DELAY_MS};

/// Attempt limit and backoff schedule for gateway calls.
///
/// The wait before attempt `n + 1` is `base_delay * 2^(n - 1)`, capped at `max_delay`.
/// A `Retry-After` hint from the gateway replaces the computed wait (still capped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first call included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Wait after the `attempt`-th failure (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let mut backoff = self.build_backoff();
        let mut delay = self.base_delay.min(self.max_delay);
        for _ in 0..attempt.max(1) {
            delay = backoff.next_backoff().unwrap_or(self.max_delay);
        }
        delay
    }

    /// Doubling schedule without jitter and without an elapsed-time limit; the caller's
    /// deadline bounds the total.
    fn build_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.base_delay.min(self.max_delay))
            .with_max_interval(self.max_delay)
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None)
            .build()
    }

    /// Runs `operation` until it succeeds, fails permanently, or attempts run out.
    pub async fn run<F, Fut, T>(&self, context: &str, mut operation: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut backoff = self.build_backoff();
        let mut attempt = 0;

        loop {
            attempt += 1;

            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(context, attempt, "Gateway call succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(err) if !err.is_transient() || attempt >= max_attempts => {
                    warn!(context, attempt, error = %err, "Gateway call failed");
                    return Err(FetchError::Gateway {
                        attempts: attempt,
                        source: err,
                    });
                }
                Err(err) => {
                    let scheduled = backoff.next_backoff().unwrap_or(self.max_delay);
                    let wait = err
                        .retry_after()
                        .map_or(scheduled, |hint| hint.min(self.max_delay));

                    warn!(
                        context,
                        attempt,
                        max_attempts,
                        error = %err,
                        wait_ms = wait.as_millis() as u64,
                        "Transient gateway failure, backing off"
                    );

                    sleep(wait).await;
                }
            }
        }
    }
}
