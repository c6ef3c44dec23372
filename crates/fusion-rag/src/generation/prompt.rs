//! Prompt template for context-grounded answering

use crate::types::RetrievedChunk;

/// System instruction framing the assistant as context-bound
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that answers questions based on provided context.";

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Concatenate retrieved chunk texts in ranked order, separated by a
    /// blank line.
    pub fn build_context(chunks: &[RetrievedChunk]) -> String {
        chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Fill the question-answering template with the context block and query
    pub fn build_user_prompt(context: &str, question: &str) -> String {
        format!(
            "Use the following context to answer the question.\n\
             Context:\n\
             {context}\n\
             Question: {question}\n\
             Answer:"
        )
    }
}
