//! Vector search client for the Qdrant collection holding the docs.
//!
//! [`QdrantIndex`] calls `POST {url}/collections/{collection}/points/search`
//! with `{ "vector": [...], "limit": 2 * top_k, "with_payload": true }`.
//! Over-fetching leaves room for several chunks of the same page to collapse
//! during deduplication. Hits are returned in the order Qdrant sends them.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::IndexConfig;
use crate::models::{HitPayload, SearchHit};

/// Why the vector index could not be queried.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("vector search timed out")]
    Timeout,
    #[error("vector index unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("vector index response was not valid JSON: {0}")]
    Decode(String),
}

impl IndexError {
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

/// Nearest-neighbour lookup over the documentation chunks.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return candidate hits for `vector`, enough to fill `top_k` unique pages.
    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<SearchHit>, IndexError>;
}

/// Number of candidates requested from the index for a given `top_k`.
pub fn candidate_limit(top_k: usize) -> usize {
    top_k.saturating_mul(2)
}

/// [`VectorIndex`] over Qdrant's REST search API.
pub struct QdrantIndex {
    client: reqwest::Client,
    url: String,
    collection: String,
}

impl QdrantIndex {
    pub fn new(config: &IndexConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/collections/{}/points/search",
            self.url, self.collection
        )
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<SearchHit>, IndexError> {
        let body = serde_json::json!({
            "vector": vector,
            "limit": candidate_limit(top_k),
            "with_payload": true,
        });

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(IndexError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, collection = %self.collection, "qdrant returned non-success status");
        }

        let json: Value = response.json().await.map_err(IndexError::from_reqwest)?;
        Ok(parse_search_response(&json))
    }
}

/// Extract hits from a Qdrant search response, preserving order.
///
/// A missing, null, or non-array `result` yields no hits. Payload fields
/// that are not strings are treated as absent; a missing score reads as `0.0`.
pub fn parse_search_response(json: &Value) -> Vec<SearchHit> {
    let Some(hits) = json.get("result").and_then(Value::as_array) else {
        return Vec::new();
    };

    hits.iter()
        .map(|hit| {
            let payload = hit.get("payload");
            let field = |name: &str| {
                payload
                    .and_then(|p| p.get(name))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };

            SearchHit {
                score: hit.get("score").and_then(Value::as_f64).unwrap_or(0.0),
                payload: HitPayload {
                    href: field("href"),
                    title: field("title"),
                    text: field("text"),
                    category: field("category"),
                },
            }
        })
        .collect()
}
