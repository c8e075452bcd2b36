//! OpenAI-compatible embeddings client.
//!
//! Sends `POST {url}` with `{"model": ..., "input": ...}` and reads `data[0].embedding`.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::GatewayError;
use super::gateway::EmbeddingGateway;
use crate::constants::{DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_TIMEOUT};

/// Connection settings for [`HttpEmbeddingGateway`].
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Per-request client timeout.
    pub request_timeout: Duration,
}

impl HttpGatewayConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key: None,
            request_timeout: DEFAULT_EMBEDDING_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

/// [`EmbeddingGateway`] backed by a remote HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingGateway {
    client: reqwest::Client,
    config: HttpGatewayConfig,
}

impl HttpEmbeddingGateway {
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::ServiceUnavailable {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpGatewayConfig {
        &self.config
    }
}

impl EmbeddingGateway for HttpEmbeddingGateway {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        if text.trim().is_empty() {
            return Err(GatewayError::InvalidInput {
                reason: "text is empty".to_string(),
            });
        }

        let mut request = self.client.post(&self.config.url).json(&EmbeddingRequest {
            model: &self.config.model,
            input: text,
        });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(classify_transport_error)?;
        let status = response.status();

        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, retry_after, &body));
        }

        let parsed: EmbeddingResponse =
            response
                .json()
                .await
                .map_err(|e| GatewayError::ServiceUnavailable {
                    reason: format!("malformed embedding response: {e}"),
                })?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|datum| datum.embedding)
            .filter(|embedding| !embedding.is_empty())
            .ok_or_else(|| GatewayError::ServiceUnavailable {
                reason: "embedding response contained no vector".to_string(),
            })?;

        debug!(
            model = %self.config.model,
            text_len = text.len(),
            dim = embedding.len(),
            "Received embedding"
        );
        Ok(embedding)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn classify_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::ServiceUnavailable {
            reason: err.to_string(),
        }
    }
}

/// Maps a non-success HTTP status to a [`GatewayError`].
pub(crate) fn classify_status(
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &str,
) -> GatewayError {
    const BODY_PREVIEW: usize = 200;
    let preview: String = body.chars().take(BODY_PREVIEW).collect();

    match status {
        StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited { retry_after },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        s if s.is_server_error() => GatewayError::ServiceUnavailable {
            reason: format!("HTTP {}: {}", s.as_u16(), preview),
        },
        s => GatewayError::InvalidInput {
            reason: format!("HTTP {}: {}", s.as_u16(), preview),
        },
    }
}

/// Reads a `Retry-After` header given in whole seconds.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
