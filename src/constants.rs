//! Cross-cutting, shared constants.
//!
//! Defaults for [`crate::config::Config`] live here.

use std::time::Duration;

/// Embedding dimension produced by the stub gateway (matches `text-embedding-3-small`).
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(DEFAULT_CACHE_TTL_SECS);

pub const DEFAULT_CACHE_MAX_SIZE: usize = 1000;

/// Midpoint of the logistic transform (raw cosine that maps to 0.5).
pub const DEFAULT_SIGMOID_X0: f64 = 0.373;

/// Steepness of the logistic transform.
pub const DEFAULT_SIGMOID_K: f64 = 15.0;

/// Exponent magnitude beyond which `exp()` is not evaluated.
///
/// `f64::exp` overflows just above 709.78.
pub const SIGMOID_EXPONENT_LIMIT: f64 = 700.0;

/// Value returned by the transform when the computation cannot produce a finite number.
pub const SIGMOID_NEUTRAL: f64 = 0.5;

pub const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(DEFAULT_EMBEDDING_TIMEOUT_SECS);

/// Total gateway attempts (first call included).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 8_000;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
