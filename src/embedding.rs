//! Embedding client for the model service.
//!
//! Defines the [`Embedder`] trait and [`ModelServiceEmbedder`], which calls
//! `POST {url}/api/v1/invoke` on the model service:
//!
//! ```json
//! { "input_data": ["deploy agent"], "model": "text-embedding-3-small",
//!   "service_type": "embedding", "task": "embed" }
//! ```
//!
//! and expects `{ "success": true, "result": { "embeddings": [[0.1, ...]] } }`.
//!
//! Exactly one attempt is made per query; the HTTP client carries the
//! configured timeout. Every way this can go wrong is reported as an
//! [`EmbeddingError`] so the caller can degrade instead of failing the request.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::EmbeddingConfig;
use crate::models::EmbeddingVector;

/// Why a query could not be embedded.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request timed out")]
    Timeout,
    #[error("embedding service unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("embedding response was not valid JSON: {0}")]
    Decode(String),
    #[error("embedding service returned no usable vector: {0}")]
    Unusable(String),
}

impl EmbeddingError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}

/// Turns query text into a vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier sent with each request.
    fn model_name(&self) -> &str;

    /// Embed a single query string.
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;
}

/// [`Embedder`] backed by the model service's invoke API.
pub struct ModelServiceEmbedder {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl ModelServiceEmbedder {
    pub fn new(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/v1/invoke", self.url)
    }
}

#[async_trait]
impl Embedder for ModelServiceEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let body = serde_json::json!({
            "input_data": [text],
            "model": self.model,
            "service_type": "embedding",
            "task": "embed",
        });

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(EmbeddingError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "model service returned non-success status");
        }

        let json: Value = response
            .json()
            .await
            .map_err(EmbeddingError::from_reqwest)?;

        parse_embedding_response(&json)
    }
}

/// Extract `result.embeddings[0]` from a model service response.
///
/// The response only counts when `success` is `true` and the first
/// embedding is a non-empty array of numbers.
pub fn parse_embedding_response(json: &Value) -> Result<EmbeddingVector, EmbeddingError> {
    if json.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(EmbeddingError::Unusable("success flag not set".to_string()));
    }

    let first = json
        .get("result")
        .and_then(|r| r.get("embeddings"))
        .and_then(Value::as_array)
        .and_then(|e| e.first())
        .and_then(Value::as_array)
        .ok_or_else(|| EmbeddingError::Unusable("missing result.embeddings[0]".to_string()))?;

    if first.is_empty() {
        return Err(EmbeddingError::Unusable("empty embedding".to_string()));
    }

    first
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| EmbeddingError::Unusable("non-numeric component".to_string()))
        })
        .collect()
}
