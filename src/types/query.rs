//! API request types

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/ask`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question to answer
    pub question: String,

    /// Number of passages to retrieve (overrides the configured default)
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl AskRequest {
    /// Create a new request with the configured default top_k
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: None,
        }
    }

    /// Override the number of passages to retrieve
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }
}

/// Request body for `POST /api/ingest/url`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestUrlRequest {
    /// URL of the document to fetch and ingest
    pub url: String,
}
