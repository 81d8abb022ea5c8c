//! Text generation provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Produces a completion for a prompt.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a full (non-streaming) completion.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Whether the backing model is reachable right now.
    async fn health_check(&self) -> Result<bool>;

    /// Short human-readable provider name for logs.
    fn name(&self) -> &str;

    /// Model identifier used for generation.
    fn model(&self) -> &str;
}
