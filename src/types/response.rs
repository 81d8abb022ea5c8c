//! Answer and API response types

use serde::{Deserialize, Serialize};

use crate::retrieval::index::ScoredPassage;
use crate::session::SessionPhase;

use super::document::DocumentSummary;

/// A grounded answer with the passages it was grounded on
///
/// `sources` is kept in retrieval rank order. It is returned to callers even
/// when the presentation layer only shows the text, so citation display can
/// be added without touching the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generated answer text
    pub text: String,
    /// Passages used to ground the answer, highest similarity first
    pub sources: Vec<ScoredPassage>,
}

/// Response from `POST /api/ask`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// Generated answer text
    pub answer: String,
    /// Passages used to ground the answer
    pub sources: Vec<ScoredPassage>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl AskResponse {
    /// Build from an answer and elapsed time
    pub fn new(answer: Answer, processing_time_ms: u64) -> Self {
        Self {
            answer: answer.text,
            sources: answer.sources,
            processing_time_ms,
        }
    }
}

/// Response from the ingestion endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Summary of the ingested document
    pub document: DocumentSummary,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Response from `GET /api/session`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Current session phase
    pub phase: SessionPhase,
    /// Summary of the current document, if one is loaded
    pub document: Option<DocumentSummary>,
}
