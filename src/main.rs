//! # Docs Search CLI (`docs-search`)
//!
//! ```bash
//! # Start the HTTP server
//! docs-search --config ./config/docs-search.toml serve
//!
//! # Run one query and print the JSON response
//! docs-search search "deploy agent" --top-k 3
//! ```
//!
//! The config file is optional; without it the built-in defaults and the
//! `MODEL_URL`, `QDRANT_URL`, `QDRANT_COLLECTION` and `SEARCH_BIND`
//! environment variables are used. Logging is controlled by `RUST_LOG`.

use clap::{Parser, Subcommand};
use docs_search::{config, search, server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Semantic search over the documentation index.
#[derive(Parser)]
#[command(name = "docs-search", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// A missing file at this path is not an error; defaults apply.
    #[arg(long, global = true, default_value = "./config/docs-search.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and serves `POST /api/search` and `GET /health`.
    Serve,

    /// Run a single query through the pipeline and print the JSON response.
    Search {
        /// The search query string.
        query: String,

        /// Number of results to return.
        #[arg(long)]
        top_k: Option<u64>,
    },
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,docs_search=debug"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let cfg = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Search { query, top_k } => {
            search::run_search(&cfg, &query, top_k).await?;
        }
    }

    Ok(())
}
