//! Model provider abstractions and the Ollama implementation

pub mod embedding;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::GenerationProvider;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaGenerator};
