//! HTTP front end for the search pipeline.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/search` | `{ query, top_k? }` → `{ results, answer }` |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Status codes
//!
//! `POST /api/search` answers `200` for every normal and degraded outcome,
//! including short queries, an unavailable model service and an empty index.
//! Only an unrecoverable failure answers `500`, with
//! `{ "results": [], "answer": "Search error" }`. A malformed request body
//! falls in that bucket too, so the body is read raw instead of through
//! Axum's `Json` extractor.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the docs front end can
//! be served from a different origin.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::models::SearchResponse;
use crate::search::{SearchService, ERROR_MESSAGE};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    service: Arc<SearchService>,
}

/// Starts the search server on `[server].bind` and runs until the process exits.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let service = SearchService::from_config(config)?;
    let listener = TcpListener::bind(&config.server.bind).await?;

    tracing::info!(
        addr = %listener.local_addr()?,
        model_url = %config.embedding.url,
        index_url = %config.index.url,
        collection = %config.index.collection,
        "search server listening"
    );

    serve(listener, service).await
}

/// Serve `service` on an already-bound listener.
pub async fn serve(listener: TcpListener, service: SearchService) -> anyhow::Result<()> {
    axum::serve(listener, router(service)).await?;
    Ok(())
}

pub fn router(service: SearchService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        service: Arc::new(service),
    };

    Router::new()
        .route("/api/search", post(handle_search))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ POST /api/search ============

async fn handle_search(State(state): State<AppState>, body: Bytes) -> Response {
    match state.service.handle_body(&body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "search request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SearchResponse::message(ERROR_MESSAGE)),
            )
                .into_response()
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
