//! Embedding provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Turns text into fixed-dimension vectors.
///
/// Implementations must be deterministic within a session: embedding the
/// same text twice returns the same vector, and every vector has exactly
/// `dimensions()` components. Embedding empty text is an error, never a
/// silent zero vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, preserving input order. The default runs
    /// sequentially; implementations may overlap requests.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Number of components in every returned vector.
    fn dimensions(&self) -> usize;

    /// Whether the backing model is reachable right now.
    async fn health_check(&self) -> Result<bool>;

    /// Short human-readable provider name for logs.
    fn name(&self) -> &str;
}
