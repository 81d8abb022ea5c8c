//! Document ingestion handlers

use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::Json;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::session::DocumentSource;
use crate::types::{IngestResponse, IngestUrlRequest};

/// POST /api/ingest
///
/// Accepts a multipart form and ingests the first field that carries a
/// filename. Any further fields are ignored.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    let start = Instant::now();

    let mut source = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::config(format!("invalid multipart request: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::config(format!("failed to read uploaded file: {e}")))?;
        source = Some(DocumentSource::bytes(filename, data.to_vec()));
        break;
    }
    let source = source.ok_or_else(|| Error::config("multipart request contains no file field"))?;

    let document = state.session().ingest(source).await?;
    Ok(Json(IngestResponse {
        document,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}

/// POST /api/ingest/url
pub async fn from_url(
    State(state): State<AppState>,
    Json(request): Json<IngestUrlRequest>,
) -> Result<Json<IngestResponse>> {
    let start = Instant::now();
    let document = state
        .session()
        .ingest(DocumentSource::url(request.url))
        .await?;
    Ok(Json(IngestResponse {
        document,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}
