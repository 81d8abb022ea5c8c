//! Document and passage types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// PDF document
    Pdf,
    /// Plain text
    Text,
    /// Markdown
    Markdown,
}

impl FileKind {
    /// Detect format from a filename extension
    pub fn from_name(filename: &str) -> Option<Self> {
        let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Human-readable format name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
            Self::Markdown => "markdown",
        }
    }
}

/// A contiguous slice of the document's text, indexed for retrieval
///
/// Passages are immutable once created. `index` is the passage's stable
/// position in chunking order; `char_start`/`char_end` are character offsets
/// into the extracted text. Consecutive passages overlap by up to the
/// configured overlap, so `char_start` of passage `n + 1` may fall before
/// `char_end` of passage `n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Stable position in chunking order (0-based)
    pub index: usize,
    /// Passage text (exact slice of the extracted document text)
    pub text: String,
    /// Character offset of the first character
    pub char_start: usize,
    /// Character offset one past the last character
    pub char_end: usize,
}

/// Summary of the currently ingested document
///
/// The document bytes and extracted text are dropped once the index is
/// built; this is what survives for status reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Source filename (uploaded name or derived from the URL)
    pub filename: String,
    /// Detected format
    pub kind: FileKind,
    /// Page count, when the format has pages
    pub pages: Option<u32>,
    /// Extracted text length in characters
    pub characters: usize,
    /// Number of indexed passages
    pub passages: usize,
    /// When ingestion completed
    pub ingested_at: DateTime<Utc>,
}
