//! Question answering handler

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AskRequest, AskResponse};

/// POST /api/ask
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let start = Instant::now();
    let session = state.session();

    let answer = match request.top_k {
        Some(top_k) => session.ask_with_top_k(&request.question, top_k).await?,
        None => session.ask(&request.question).await?,
    };

    let elapsed_ms = start.elapsed().as_millis() as u64;
    info!(
        question_chars = request.question.chars().count(),
        sources = answer.sources.len(),
        elapsed_ms,
        "question answered"
    );
    Ok(Json(AskResponse::new(answer, elapsed_ms)))
}
