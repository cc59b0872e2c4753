//! Data types that flow through the search pipeline.
//!
//! Everything here is built fresh per request and dropped once the response
//! is written; nothing is cached between requests.

use serde::{Deserialize, Serialize};

/// Inbound body of `POST /api/search`.
///
/// Both fields are optional on the wire: a missing `query` takes the
/// short-circuit path and a missing `top_k` falls back to the configured default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub top_k: Option<u64>,
}

/// Query embedding returned by the model service.
pub type EmbeddingVector = Vec<f32>;

/// A raw hit from the vector index, in index order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Similarity as reported by the index; never renormalized.
    pub score: f64,
    pub payload: HitPayload,
}

/// Payload stored alongside each indexed chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitPayload {
    /// Document locator and dedup key.
    pub href: Option<String>,
    pub title: Option<String>,
    /// Full chunk text.
    pub text: Option<String>,
    pub category: Option<String>,
}

/// A deduplicated, user-facing result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub description: String,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub score: f64,
}

/// Response body of `POST /api/search`.
///
/// `answer` is always present on the wire, as `null` when there is nothing to say.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub answer: Option<String>,
}

impl SearchResponse {
    /// `{ results: [], answer: null }`
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            answer: None,
        }
    }

    /// Empty results carrying a status message.
    pub fn message(answer: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            answer: Some(answer.into()),
        }
    }
}
