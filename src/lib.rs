//! # Docs Search
//!
//! Semantic search for a documentation site. A free-text query is embedded
//! by an external model service, matched against a Qdrant collection of
//! documentation chunks, and the hits are collapsed into one result per page.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │  HTTP /  │──▶│  Embedding │──▶│   Vector   │──▶│ Aggregator │
//! │   CLI    │   │   client   │   │   search   │   │ dedup+trim │
//! └──────────┘   └────────────┘   └────────────┘   └────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and env overrides |
//! | [`models`] | Request, hit, and response types |
//! | [`embedding`] | Model service client |
//! | [`index`] | Qdrant search client |
//! | [`aggregate`] | Deduplication, truncation, status message |
//! | [`search`] | Pipeline orchestration and failure handling |
//! | [`server`] | `POST /api/search` HTTP server |

pub mod aggregate;
pub mod config;
pub mod embedding;
pub mod index;
pub mod models;
pub mod search;
pub mod server;
