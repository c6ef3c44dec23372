//! Chat model provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for single-turn chat completion.
///
/// Implementations:
/// - `OpenAiChat`: OpenAI-compatible chat completions API
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete a single turn: a system framing message plus one user
    /// message. Returns the raw model output.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Check if the model endpoint is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// The model being used
    fn model(&self) -> &str;
}
