//! Document ingestion: fetch, text extraction, chunking

pub mod chunker;
pub mod extractor;
pub mod fetcher;

pub use chunker::Chunker;
pub use extractor::{ExtractedText, TextExtractor};
pub use fetcher::{DocumentFetcher, FetchedDocument};
