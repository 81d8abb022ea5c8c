//! Single-document chat session
//!
//! A session owns at most one indexed document at a time. Ingestion swaps
//! the whole index atomically: questions either see the previous complete
//! document or the new one, never a half-built index. A failed ingestion
//! leaves whatever was there before.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::generation::AnswerSynthesizer;
use crate::ingestion::{Chunker, DocumentFetcher, TextExtractor};
use crate::providers::{
    EmbeddingProvider, GenerationProvider, OllamaClient, OllamaEmbedder, OllamaGenerator,
};
use crate::retrieval::{Retriever, ScoredPassage, VectorIndex};
use crate::types::{Answer, DocumentSummary, Passage};

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// No document has been ingested yet.
    Empty,
    /// An ingestion is in flight.
    Ingesting,
    /// A document is indexed and questions can be answered.
    Ready,
}

/// A document to ingest, either raw bytes or a URL to download.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Bytes { filename: String, data: Vec<u8> },
    Url(String),
}

impl DocumentSource {
    pub fn bytes(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self::Bytes {
            filename: filename.into(),
            data,
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }
}

struct SessionState {
    phase: SessionPhase,
    index: Option<Arc<VectorIndex>>,
    document: Option<DocumentSummary>,
}

/// Puts the phase back if an ingestion future is dropped at an await point
/// before it commits or rolls back, as happens when the HTTP client
/// disconnects and the handler future is dropped mid-ingest.
struct PhaseRestore<'a> {
    state: &'a RwLock<SessionState>,
    prior: SessionPhase,
    armed: bool,
}

impl Drop for PhaseRestore<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.write().phase = self.prior;
        }
    }
}

/// One conversation with one document.
pub struct ChatSession {
    config: ChatConfig,
    chunker: Chunker,
    fetcher: DocumentFetcher,
    embedder: Arc<dyn EmbeddingProvider>,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    state: RwLock<SessionState>,
    ingest_lock: tokio::sync::Mutex<()>,
}

impl ChatSession {
    /// Build a session with explicit providers.
    pub fn new(
        config: ChatConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let chunker = Chunker::new(config.chunking.max_chunk_size, config.chunking.overlap)?;
        let fetcher = DocumentFetcher::new(&config.fetch)?;
        let retriever = Retriever::new(embedder.clone());
        let synthesizer = AnswerSynthesizer::new(generator);

        Ok(Self {
            config,
            chunker,
            fetcher,
            embedder,
            retriever,
            synthesizer,
            state: RwLock::new(SessionState {
                phase: SessionPhase::Empty,
                index: None,
                document: None,
            }),
            ingest_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Build a session with both providers backed by one Ollama client.
    pub fn with_ollama(config: ChatConfig) -> Result<Self> {
        let client = Arc::new(OllamaClient::new(&config.llm)?);
        let embedder = Arc::new(OllamaEmbedder::from_client(client.clone()));
        let generator = Arc::new(OllamaGenerator::from_client(client));
        Self::new(config, embedder, generator)
    }

    /// Ingest a document, replacing any previously indexed one.
    ///
    /// Concurrent ingestions are serialized. On failure, or if the returned
    /// future is dropped before completion, the previous document (or the
    /// empty state) is restored and any existing index kept.
    pub async fn ingest(&self, source: DocumentSource) -> Result<DocumentSummary> {
        let _lock = self.ingest_lock.lock().await;
        let prior = {
            let mut state = self.state.write();
            let prior = state.phase;
            state.phase = SessionPhase::Ingesting;
            prior
        };
        let mut restore = PhaseRestore {
            state: &self.state,
            prior,
            armed: true,
        };

        let (index, summary) = self.run_ingest(source).await?;

        let mut state = self.state.write();
        state.index = Some(Arc::new(index));
        state.document = Some(summary.clone());
        state.phase = SessionPhase::Ready;
        restore.armed = false;
        drop(state);
        info!(
            filename = %summary.filename,
            kind = summary.kind.as_str(),
            passages = summary.passages,
            characters = summary.characters,
            "document ingested"
        );
        Ok(summary)
    }

    async fn run_ingest(&self, source: DocumentSource) -> Result<(VectorIndex, DocumentSummary)> {
        let (filename, data) = match source {
            DocumentSource::Bytes { filename, data } => (filename, data),
            DocumentSource::Url(url) => {
                info!(url = %url, "fetching document");
                let fetched = self.fetcher.fetch(&url).await?;
                (fetched.filename, fetched.data)
            }
        };

        let extracted = TextExtractor::extract(&filename, &data)?;
        let characters = extracted.text.chars().count();
        let passages: Vec<Passage> = self.chunker.chunk(&extracted.text).collect();
        info!(
            filename = %filename,
            characters,
            passages = passages.len(),
            "document chunked"
        );

        let vectors = if passages.is_empty() {
            Vec::new()
        } else {
            let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
            self.embedder.embed_many(&texts).await?
        };

        let index = VectorIndex::build(passages, vectors, self.embedder.dimensions())?;
        let summary = DocumentSummary {
            filename,
            kind: extracted.kind,
            pages: extracted.pages,
            characters,
            passages: index.len(),
            ingested_at: Utc::now(),
        };
        Ok((index, summary))
    }

    /// Answer a question using the configured number of passages.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        self.ask_with_top_k(question, self.config.retrieval.top_k)
            .await
    }

    /// Answer a question, retrieving up to `top_k` passages.
    pub async fn ask_with_top_k(&self, question: &str, top_k: usize) -> Result<Answer> {
        let index = {
            let state = self.state.read();
            if state.phase != SessionPhase::Ready {
                return Err(Error::NotReady);
            }
            match &state.index {
                Some(index) => Arc::clone(index),
                None => return Err(Error::NotReady),
            }
        };

        // A document with no extractable text indexes zero passages; skip
        // retrieval entirely rather than embed a question for nothing.
        let hits: Vec<ScoredPassage> = if index.is_empty() {
            Vec::new()
        } else {
            self.retriever.retrieve(question, &index, top_k).await?
        };
        self.synthesizer.synthesize(question, hits).await
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.read().phase
    }

    pub fn document(&self) -> Option<DocumentSummary> {
        self.state.read().document.clone()
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }
}
