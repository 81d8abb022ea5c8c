//! Error types for the document chat pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
///
/// Each variant names the stage it came from, so callers can tell
/// "couldn't load the document" apart from "couldn't search it" apart from
/// "couldn't answer".
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote document fetch failure (bad URL, non-2xx, network)
    #[error("Failed to fetch '{url}': {message}")]
    Fetch { url: String, message: String },

    /// Text extraction failure (corrupt or unsupported document)
    #[error("Failed to extract text from '{filename}': {message}")]
    Extraction { filename: String, message: String },

    /// Embedding backend failure
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Generation backend failure
    #[error("Answer generation failed: {0}")]
    Generation(String),

    /// Vector dimension invariant violation
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// No document has been ingested yet (or ingestion is in progress)
    #[error("Session is not ready: no document index is available")]
    NotReady,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a fetch error
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::Fetch { url, message } => (
                StatusCode::BAD_GATEWAY,
                "fetch_error",
                format!("Failed to fetch '{}': {}", url, message),
            ),
            Error::Extraction { filename, message } => (
                StatusCode::BAD_REQUEST,
                "extraction_error",
                format!("Failed to extract text from '{}': {}", filename, message),
            ),
            Error::Embedding(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "embedding_error", msg.clone())
            }
            Error::Generation(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "generation_error", msg.clone())
            }
            Error::DimensionMismatch { expected, actual } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "dimension_mismatch",
                format!("Dimension mismatch: expected {}, got {}", expected, actual),
            ),
            Error::NotReady => (
                StatusCode::CONFLICT,
                "not_ready",
                "No document has been ingested yet".to_string(),
            ),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
