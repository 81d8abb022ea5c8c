//! API route table and small informational handlers

pub mod ask;
pub mod ingest;

use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::server::state::AppState;
use crate::types::SessionResponse;

/// Routes mounted under `/api`.
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/ingest", post(ingest::upload))
        .route("/ingest/url", post(ingest::from_url))
        .route("/ask", post(ask::ask))
        .route("/session", get(session_info))
        .route("/info", get(service_info))
        .layer(DefaultBodyLimit::max(max_upload_size))
}

/// GET /api/session
async fn session_info(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        phase: state.session().phase(),
        document: state.session().document(),
    })
}

/// GET /api/info
async fn service_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "embedding_model": config.llm.embed_model,
        "generation_model": config.llm.generate_model,
        "supported_formats": ["pdf", "txt", "md"],
        "max_upload_size": config.server.max_upload_size,
        "default_top_k": config.retrieval.top_k,
    }))
}
