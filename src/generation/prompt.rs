//! Prompt assembly for grounded question answering

use crate::retrieval::ScoredPassage;

/// Fixed reply used when the index has nothing to offer for a question.
/// Also quoted inside the prompt so the model falls back to the same wording.
pub const INSUFFICIENT_CONTEXT_ANSWER: &str =
    "The document does not contain enough information to answer this question.";

/// Builds the prompts sent to the generation model.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Format retrieved passages as numbered context blocks.
    pub fn build_context(hits: &[ScoredPassage]) -> String {
        let mut context = String::new();
        for (i, hit) in hits.iter().enumerate() {
            context.push_str(&format!("[{}]\n{}\n\n---\n\n", i + 1, hit.passage.text));
        }
        context
    }

    /// Wrap the question and context in grounding instructions.
    pub fn build_grounded_prompt(question: &str, context: &str) -> String {
        format!(
            "You are a careful assistant answering questions about a single document.\n\n\
             Use ONLY the numbered context passages below. Rules:\n\
             1. Base every statement on the context passages.\n\
             2. If the passages do not contain the information needed, reply exactly: \
             \"{INSUFFICIENT_CONTEXT_ANSWER}\"\n\
             3. Do not use outside knowledge and do not guess.\n\
             4. Be concise and direct.\n\n\
             Context:\n{context}\n\
             Question: {question}\n\n\
             Answer:"
        )
    }
}
