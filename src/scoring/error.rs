use thiserror::Error;

use crate::embedding::{FetchError, GatewayError};

/// Failure of a scoring request.
///
/// Only terminal gateway failures escape the orchestrator; cache and numeric faults are
/// absorbed before this point.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("embedding unavailable: {0}")]
    Gateway(#[from] FetchError),
}

impl ScoringError {
    /// `true` when the caller should answer "temporarily unavailable, retry".
    ///
    /// Rejected input is the one gateway failure a retry will not fix.
    pub fn is_unavailable(&self) -> bool {
        match self {
            ScoringError::Gateway(err) => !matches!(
                err.gateway_error(),
                Some(GatewayError::InvalidInput { .. })
            ),
        }
    }

    pub fn fetch_error(&self) -> &FetchError {
        match self {
            ScoringError::Gateway(err) => err,
        }
    }
}
