//! The query-to-results pipeline.
//!
//! [`SearchService::search`] runs one request through a strict sequence:
//!
//! ```text
//! validate ──▶ embed ──▶ vector search ──▶ aggregate
//!    │           │             │
//!    ▼           ▼             ▼
//!  {[], null}  {[], "Search   timeout: no hits
//!              temporarily    transport/decode: SearchError
//!              unavailable"}
//! ```
//!
//! Embedding failures and index timeouts degrade to a well-formed response.
//! Anything else comes back as a [`SearchError`], which the HTTP layer turns
//! into a 500 with `answer = "Search error"`.

use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::embedding::{Embedder, ModelServiceEmbedder};
use crate::index::{IndexError, QdrantIndex, VectorIndex};
use crate::models::{SearchRequest, SearchResponse};

/// Answer sent when the query could not be embedded.
pub const UNAVAILABLE_MESSAGE: &str = "Search temporarily unavailable";

/// Answer sent with a 500 when the pipeline fails outright.
pub const ERROR_MESSAGE: &str = "Search error";

/// A failure the pipeline could not recover from.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Embedder, index and limits for one deployment.
///
/// Holds no per-request state; a single instance serves all requests.
#[derive(Clone)]
pub struct SearchService {
    config: Arc<Config>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl SearchService {
    pub fn new(config: Arc<Config>, embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            config,
            embedder,
            index,
        }
    }

    /// Build the HTTP-backed service described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = ModelServiceEmbedder::new(&config.embedding)?;
        let index = QdrantIndex::new(&config.index)?;
        Ok(Self::new(
            Arc::new(config.clone()),
            Arc::new(embedder),
            Arc::new(index),
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse a raw JSON request body and run it.
    pub async fn handle_body(&self, body: &[u8]) -> Result<SearchResponse, SearchError> {
        let request: SearchRequest = serde_json::from_slice(body)?;
        self.search(&request).await
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let limits = &self.config.search;

        let query = match request.query.as_deref() {
            Some(q) if q.chars().count() >= limits.min_query_chars => q,
            _ => return Ok(SearchResponse::empty()),
        };
        let top_k = limits.effective_top_k(request.top_k);

        tracing::debug!(query, top_k, model = self.embedder.model_name(), "embedding query");
        let vector = match self.embedder.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "embedding failed, returning degraded response");
                return Ok(SearchResponse::message(UNAVAILABLE_MESSAGE));
            }
        };

        tracing::debug!(dims = vector.len(), top_k, "searching vector index");
        let hits = match self.index.search(&vector, top_k).await {
            Ok(hits) => hits,
            Err(IndexError::Timeout) => {
                tracing::warn!("vector search timed out, returning no results");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let aggregated = aggregate(&hits, top_k, limits.description_chars);
        tracing::debug!(
            hits = hits.len(),
            results = aggregated.results.len(),
            "aggregated search hits"
        );

        Ok(SearchResponse {
            results: aggregated.results,
            answer: aggregated.answer,
        })
    }
}

/// `docs-search search "<query>"`: run the pipeline once and print the JSON response.
pub async fn run_search(config: &Config, query: &str, top_k: Option<u64>) -> Result<()> {
    let service = SearchService::from_config(config)?;
    let request = SearchRequest {
        query: Some(query.to_string()),
        top_k,
    };

    let response = service.search(&request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
