//! TOML configuration with environment overrides.
//!
//! Every section is optional; omitted values fall back to the defaults the
//! documentation site has always run with (a local model service on `:8082`,
//! a local Qdrant on `:6333`, collection `isa_docs`).
//!
//! After the file is parsed, the following environment variables override it:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `MODEL_URL` | `embedding.url` |
//! | `QDRANT_URL` | `index.url` |
//! | `QDRANT_COLLECTION` | `index.collection` |
//! | `SEARCH_BIND` | `server.bind` |

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

/// Model service used to embed queries.
#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_model_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_model_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_model_url() -> String {
    "http://localhost:8082".to_string()
}
fn default_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

/// Qdrant collection holding the documentation chunks.
#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_index_url")]
    pub url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: default_index_url(),
            collection: default_collection(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl IndexConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_index_url() -> String {
    "http://localhost:6333".to_string()
}
fn default_collection() -> String {
    "isa_docs".to_string()
}

/// Request-shaping knobs for the search pipeline.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
    #[serde(default = "default_description_chars")]
    pub description_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            max_top_k: default_max_top_k(),
            min_query_chars: default_min_query_chars(),
            description_chars: default_description_chars(),
        }
    }
}

impl SearchConfig {
    /// Resolve a caller-supplied `top_k` into the range the pipeline accepts.
    pub fn effective_top_k(&self, requested: Option<u64>) -> usize {
        let requested = requested
            .map(|k| usize::try_from(k).unwrap_or(usize::MAX))
            .unwrap_or(self.default_top_k);
        requested.clamp(1, self.max_top_k)
    }
}

fn default_top_k() -> usize {
    5
}
fn default_max_top_k() -> usize {
    50
}
fn default_min_query_chars() -> usize {
    2
}
fn default_description_chars() -> usize {
    150
}

impl Config {
    /// All-defaults configuration, used when no config file is present.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Apply `MODEL_URL`, `QDRANT_URL`, `QDRANT_COLLECTION` and `SEARCH_BIND`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("MODEL_URL") {
            self.embedding.url = url;
        }
        if let Some(url) = lookup("QDRANT_URL") {
            self.index.url = url;
        }
        if let Some(collection) = lookup("QDRANT_COLLECTION") {
            self.index.collection = collection;
        }
        if let Some(bind) = lookup("SEARCH_BIND") {
            self.server.bind = bind;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding.url.trim().is_empty() {
            bail!("embedding.url must not be empty");
        }
        if self.index.url.trim().is_empty() {
            bail!("index.url must not be empty");
        }
        if self.index.collection.trim().is_empty() {
            bail!("index.collection must not be empty");
        }
        if self.embedding.timeout_secs == 0 {
            bail!("embedding.timeout_secs must be > 0");
        }
        if self.index.timeout_secs == 0 {
            bail!("index.timeout_secs must be > 0");
        }
        if self.search.default_top_k < 1 {
            bail!("search.default_top_k must be >= 1");
        }
        if self.search.max_top_k < self.search.default_top_k {
            bail!("search.max_top_k must be >= search.default_top_k");
        }
        Ok(())
    }
}

/// Parse a config file from disk, then apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    config.apply_env();
    config.validate()?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields [`Config::minimal`] plus env overrides.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        return load_config(path);
    }
    let mut config = Config::minimal();
    config.apply_env();
    config.validate()?;
    Ok(config)
}
