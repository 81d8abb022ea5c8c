//! Chat with a single document.
//!
//! The pipeline: extract text from an uploaded or downloaded document,
//! split it into overlapping passages, embed each passage, and index the
//! vectors in memory. Questions are embedded with the same model, matched
//! against the index by cosine similarity, and answered by a generation
//! model that is constrained to the retrieved passages.
//!
//! A [`ChatSession`] holds one document at a time; ingesting a new one
//! atomically replaces the old. The bundled server exposes the session
//! over HTTP.
//!
//! ```no_run
//! # async fn run() -> pdf_chat::Result<()> {
//! use pdf_chat::{ChatConfig, ChatSession, DocumentSource};
//!
//! let session = ChatSession::with_ollama(ChatConfig::default())?;
//! session
//!     .ingest(DocumentSource::bytes(
//!         "notes.txt",
//!         b"Cats are mammals.".to_vec(),
//!     ))
//!     .await?;
//! let answer = session.ask("What are cats?").await?;
//! println!("{}", answer.text);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod types;

#[cfg(test)]
mod testutil;

pub use config::ChatConfig;
pub use error::{Error, Result};
pub use retrieval::{ScoredPassage, VectorIndex};
pub use session::{ChatSession, DocumentSource, SessionPhase};
pub use types::{Answer, DocumentSummary, FileKind, Passage};
