//! Generates a final answer from ranked retrieval results

use std::sync::Arc;

use crate::error::Result;
use crate::providers::ChatModel;
use crate::types::RetrievedChunk;

use super::prompt::{PromptBuilder, SYSTEM_PROMPT};

/// Fills the fixed prompt template with retrieved context and calls the
/// chat model.
pub struct AnswerGenerator {
    model: Arc<dyn ChatModel>,
    /// Upper bound on the concatenated context, in characters
    max_context_chars: usize,
}

impl AnswerGenerator {
    /// Create a new generator
    pub fn new(model: Arc<dyn ChatModel>, max_context_chars: usize) -> Self {
        Self {
            model,
            max_context_chars,
        }
    }

    /// Generate an answer for `question` grounded in `chunks`.
    ///
    /// Ranked chunks that would push the context block past the budget are
    /// dropped, lowest-ranked first, instead of being passed through to fail
    /// at the model's input limit. An empty chunk list is valid; the model
    /// is asked to answer from an empty context.
    pub async fn generate(&self, question: &str, chunks: &[RetrievedChunk]) -> Result<String> {
        let kept = self.fit_to_budget(chunks);
        if kept.len() < chunks.len() {
            tracing::warn!(
                "Context budget of {} chars exceeded, dropping {} of {} retrieved chunks",
                self.max_context_chars,
                chunks.len() - kept.len(),
                chunks.len()
            );
        }

        let context = PromptBuilder::build_context(kept);
        let prompt = PromptBuilder::build_user_prompt(&context, question);

        let answer = self.model.complete(SYSTEM_PROMPT, &prompt).await?;
        Ok(answer.trim().to_string())
    }

    /// Longest ranked prefix whose joined context stays within the budget
    fn fit_to_budget<'a>(&self, chunks: &'a [RetrievedChunk]) -> &'a [RetrievedChunk] {
        let mut total = 0usize;
        for (index, chunk) in chunks.iter().enumerate() {
            let separator = if index > 0 { 2 } else { 0 };
            let length = chunk.text.chars().count() + separator;
            if total + length > self.max_context_chars {
                return &chunks[..index];
            }
            total += length;
        }
        chunks
    }
}
