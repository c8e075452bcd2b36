use std::time::Duration;
use thiserror::Error;

/// Failure reported by an [`super::EmbeddingGateway`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("embedding gateway rate limited")]
    RateLimited { retry_after: Option<Duration> },

    #[error("embedding request timed out")]
    Timeout,

    #[error("embedding service unavailable: {reason}")]
    ServiceUnavailable { reason: String },

    #[error("invalid embedding input: {reason}")]
    InvalidInput { reason: String },
}

impl GatewayError {
    /// `true` for failures worth retrying (rate limits and timeouts).
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::RateLimited { .. } | GatewayError::Timeout)
    }

    /// Server-provided wait hint, if any.
    #[inline]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GatewayError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Terminal failure of an embedding fetch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The gateway failed permanently or kept failing until attempts ran out.
    #[error("embedding gateway failed after {attempts} attempt(s): {source}")]
    Gateway {
        attempts: u32,
        #[source]
        source: GatewayError,
    },

    /// The request deadline elapsed while waiting on the gateway.
    #[error("embedding fetch exceeded deadline of {timeout:?}")]
    DeadlineExceeded { timeout: Duration },
}

impl FetchError {
    /// Returns the last gateway error, if the failure came from the gateway.
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            FetchError::Gateway { source, .. } => Some(source),
            FetchError::DeadlineExceeded { .. } => None,
        }
    }

    /// Number of gateway attempts made, if known.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            FetchError::Gateway { attempts, .. } => Some(*attempts),
            FetchError::DeadlineExceeded { .. } => None,
        }
    }
}
