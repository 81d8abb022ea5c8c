//! Answer synthesis from retrieved passages

pub mod prompt;

pub use prompt::{PromptBuilder, INSUFFICIENT_CONTEXT_ANSWER};

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::providers::GenerationProvider;
use crate::retrieval::ScoredPassage;
use crate::types::Answer;

/// Turns retrieved passages and a question into a grounded answer.
pub struct AnswerSynthesizer {
    generator: Arc<dyn GenerationProvider>,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn GenerationProvider>) -> Self {
        Self { generator }
    }

    /// Generate an answer from the retrieved passages.
    ///
    /// With no passages there is nothing to ground an answer in, so the
    /// fixed insufficient-context reply is returned without calling the
    /// model at all.
    pub async fn synthesize(&self, question: &str, hits: Vec<ScoredPassage>) -> Result<Answer> {
        if hits.is_empty() {
            debug!("no passages retrieved, skipping generation");
            return Ok(Answer {
                text: INSUFFICIENT_CONTEXT_ANSWER.to_string(),
                sources: hits,
            });
        }

        let context = PromptBuilder::build_context(&hits);
        let prompt = PromptBuilder::build_grounded_prompt(question, &context);
        debug!(
            model = self.generator.model(),
            passages = hits.len(),
            "generating answer"
        );
        let text = self.generator.generate(&prompt).await?;

        Ok(Answer {
            text: text.trim().to_string(),
            sources: hits,
        })
    }
}
