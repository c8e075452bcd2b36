//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `MATCHSCORE_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CACHE_MAX_SIZE, DEFAULT_CACHE_TTL, DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_TIMEOUT,
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_RETRY_MAX_DELAY_MS,
    DEFAULT_SIGMOID_K, DEFAULT_SIGMOID_X0,
};
use crate::embedding::{HttpGatewayConfig, RetryPolicy};
use crate::scoring::SigmoidParams;

/// Engine configuration, read once at construction time.
///
/// Use [`Config::from_env`] to read `MATCHSCORE_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Lifetime of cached embeddings. Default: 60 minutes.
    pub cache_ttl: Duration,

    /// Max entries per cache store. Default: `1000`.
    pub cache_max_size: usize,

    /// Sigmoid midpoint. Default: `0.373`.
    pub sigmoid_x0: f64,

    /// Sigmoid steepness. Default: `15.0`.
    pub sigmoid_k: f64,

    /// Deadline for fetching both embeddings of one request. Default: 30 seconds.
    pub embedding_timeout: Duration,

    /// Total gateway attempts per text. Default: `3`.
    pub max_retries: u32,

    /// First backoff delay. Default: 1 second.
    pub retry_base_delay: Duration,

    /// Backoff cap. Default: 8 seconds.
    pub retry_max_delay: Duration,

    /// Embeddings endpoint. `None` selects the offline stub gateway.
    pub embedding_url: Option<String>,

    /// Model name sent to the endpoint. Default: `text-embedding-3-small`.
    pub embedding_model: String,

    /// Bearer token for the endpoint.
    pub embedding_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_max_size: DEFAULT_CACHE_MAX_SIZE,
            sigmoid_x0: DEFAULT_SIGMOID_X0,
            sigmoid_k: DEFAULT_SIGMOID_K,
            embedding_timeout: DEFAULT_EMBEDDING_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
            retry_max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
            embedding_url: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_api_key: None,
        }
    }
}

impl Config {
    const ENV_CACHE_TTL_SECS: &'static str = "MATCHSCORE_CACHE_TTL_SECS";
    const ENV_CACHE_MAX_SIZE: &'static str = "MATCHSCORE_CACHE_MAX_SIZE";
    const ENV_SIGMOID_X0: &'static str = "MATCHSCORE_SIGMOID_X0";
    const ENV_SIGMOID_K: &'static str = "MATCHSCORE_SIGMOID_K";
    const ENV_EMBEDDING_TIMEOUT_SECS: &'static str = "MATCHSCORE_EMBEDDING_TIMEOUT_SECS";
    const ENV_MAX_RETRIES: &'static str = "MATCHSCORE_MAX_RETRIES";
    const ENV_RETRY_BASE_DELAY_MS: &'static str = "MATCHSCORE_RETRY_BASE_DELAY_MS";
    const ENV_RETRY_MAX_DELAY_MS: &'static str = "MATCHSCORE_RETRY_MAX_DELAY_MS";
    const ENV_EMBEDDING_URL: &'static str = "MATCHSCORE_EMBEDDING_URL";
    const ENV_EMBEDDING_MODEL: &'static str = "MATCHSCORE_EMBEDDING_MODEL";
    const ENV_EMBEDDING_API_KEY: &'static str = "MATCHSCORE_EMBEDDING_API_KEY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cache_ttl = Self::parse_from_env(Self::ENV_CACHE_TTL_SECS)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);
        let cache_max_size =
            Self::parse_from_env(Self::ENV_CACHE_MAX_SIZE)?.unwrap_or(defaults.cache_max_size);
        let sigmoid_x0 = Self::parse_from_env(Self::ENV_SIGMOID_X0)?.unwrap_or(defaults.sigmoid_x0);
        let sigmoid_k = Self::parse_from_env(Self::ENV_SIGMOID_K)?.unwrap_or(defaults.sigmoid_k);
        let embedding_timeout = Self::parse_from_env(Self::ENV_EMBEDDING_TIMEOUT_SECS)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.embedding_timeout);
        let max_retries =
            Self::parse_from_env(Self::ENV_MAX_RETRIES)?.unwrap_or(defaults.max_retries);
        let retry_base_delay = Self::parse_from_env(Self::ENV_RETRY_BASE_DELAY_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_base_delay);
        let retry_max_delay = Self::parse_from_env(Self::ENV_RETRY_MAX_DELAY_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_max_delay);
        let embedding_url = Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_URL);
        let embedding_model = Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_MODEL)
            .unwrap_or(defaults.embedding_model);
        let embedding_api_key = Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_API_KEY);

        Ok(Self {
            cache_ttl,
            cache_max_size,
            sigmoid_x0,
            sigmoid_k,
            embedding_timeout,
            max_retries,
            retry_base_delay,
            retry_max_delay,
            embedding_url,
            embedding_model,
            embedding_api_key,
        })
    }

    /// Checks the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_max_size == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "cache_max_size",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.cache_ttl.is_zero() {
            return Err(ConfigError::InvalidSetting {
                name: "cache_ttl",
                reason: "must be greater than zero".to_string(),
            });
        }

        if !self.sigmoid_x0.is_finite() || !(0.0..=1.0).contains(&self.sigmoid_x0) {
            return Err(ConfigError::InvalidSetting {
                name: "sigmoid_x0",
                reason: format!("must be within [0, 1], got {}", self.sigmoid_x0),
            });
        }

        // k <= 0 would make the transform flat or decreasing.
        if !self.sigmoid_k.is_finite() || self.sigmoid_k <= 0.0 {
            return Err(ConfigError::InvalidSetting {
                name: "sigmoid_k",
                reason: format!("must be a positive finite number, got {}", self.sigmoid_k),
            });
        }

        if self.embedding_timeout.is_zero() {
            return Err(ConfigError::InvalidSetting {
                name: "embedding_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.max_retries == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "max_retries",
                reason: "must allow at least one attempt".to_string(),
            });
        }

        if self.retry_max_delay < self.retry_base_delay {
            return Err(ConfigError::InvalidSetting {
                name: "retry_max_delay",
                reason: format!(
                    "{:?} is below retry_base_delay {:?}",
                    self.retry_max_delay, self.retry_base_delay
                ),
            });
        }

        if let Some(url) = &self.embedding_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidSetting {
                name: "embedding_url",
                reason: format!("'{url}' is not an http(s) URL"),
            });
        }

        Ok(())
    }

    pub fn sigmoid_params(&self) -> SigmoidParams {
        SigmoidParams::new(self.sigmoid_x0, self.sigmoid_k)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_base_delay, self.retry_max_delay)
    }

    /// HTTP gateway settings, if an endpoint is configured.
    pub fn http_gateway_config(&self) -> Option<HttpGatewayConfig> {
        self.embedding_url.as_ref().map(|url| {
            HttpGatewayConfig::new(url.clone())
                .with_model(self.embedding_model.clone())
                .with_api_key(self.embedding_api_key.clone())
                .with_request_timeout(self.embedding_timeout)
        })
    }

    fn parse_from_env<T>(var_name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) if value.trim().is_empty() => Ok(None),
            Ok(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: var_name,
                    value: value.clone(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(None),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
