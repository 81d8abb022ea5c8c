//! Configuration for the document chat service

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Ollama/LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Remote document fetch configuration
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl ChatConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            Error::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the path in `PDFCHAT_CONFIG`, or fall back to defaults
    pub fn load() -> Result<Self> {
        match std::env::var("PDFCHAT_CONFIG") {
            Ok(path) => Self::from_file(path),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Validate invariants that the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if self.chunking.max_chunk_size == 0 {
            return Err(Error::config("chunking.max_chunk_size must be positive"));
        }
        if self.chunking.overlap >= self.chunking.max_chunk_size {
            return Err(Error::config(format!(
                "chunking.overlap ({}) must be smaller than chunking.max_chunk_size ({})",
                self.chunking.overlap, self.chunking.max_chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::config("retrieval.top_k must be at least 1"));
        }
        if self.llm.embed_dimensions == 0 {
            return Err(Error::config("llm.embed_dimensions must be positive"));
        }
        if self.llm.embed_concurrency == 0 {
            return Err(Error::config("llm.embed_concurrency must be at least 1"));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Embedding dimensions (384 for all-minilm, 768 for nomic-embed-text)
    pub embed_dimensions: usize,
    /// Number of passages embedded concurrently during ingestion
    pub embed_concurrency: usize,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "all-minilm".to_string(),
            embed_dimensions: 384,
            embed_concurrency: 8,
            generate_model: "llama2".to_string(),
            temperature: 0.2, // Lower for more factual answers
            timeout_secs: 120,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub max_chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            overlap: 200,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of passages to retrieve per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

/// Remote document fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Fetch timeout in seconds
    pub timeout_secs: u64,
    /// Maximum download size in bytes (default: 50MB)
    pub max_download_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_download_size: 50 * 1024 * 1024, // 50MB
        }
    }
}
