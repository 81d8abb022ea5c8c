//! Core types for documents, requests, and responses

pub mod document;
pub mod query;
pub mod response;

pub use document::{DocumentSummary, FileKind, Passage};
pub use query::{AskRequest, IngestUrlRequest};
pub use response::{Answer, AskResponse, IngestResponse, SessionResponse};
