//! OpenAI-compatible chat completions client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::chat::ChatModel;
use super::retry_request;

/// Chat completions client with automatic retry
pub struct OpenAiChat {
    /// HTTP client
    client: Client,
    /// Configuration
    config: LlmConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OpenAiChat {
    /// Create a new client
    pub fn new(config: &LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config: config.clone(),
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);

        tracing::info!("Generating answer with model: {}", self.config.model);

        retry_request(self.config.max_retries, || {
            let url = url.clone();

            async move {
                let request = ChatRequest {
                    model: &self.config.model,
                    messages: vec![
                        ChatMessage {
                            role: "system",
                            content: system_prompt,
                        },
                        ChatMessage {
                            role: "user",
                            content: user_prompt,
                        },
                    ],
                    max_tokens: self.config.max_tokens,
                    temperature: self.config.temperature,
                };

                let response = self
                    .authorized(self.client.post(&url))
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::Generation(format!("Chat request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Generation(format!(
                        "Chat completion failed: HTTP {} - {}",
                        status, body
                    )));
                }

                let chat_response: ChatResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Generation(format!("Malformed chat response: {}", e)))?;

                chat_response
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message.content)
                    .ok_or_else(|| Error::Generation("Model returned no choices".to_string()))
            }
        })
        .await
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.config.base_url);

        match self.authorized(self.client.get(&url)).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_response_parsing() {
        let raw = serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "X is a widget."}}
            ]
        });
        let parsed: ChatResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "X is a widget.");
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-4.1-mini",
            messages: vec![
                ChatMessage { role: "system", content: "sys" },
                ChatMessage { role: "user", content: "usr" },
            ],
            max_tokens: 512,
            temperature: 0.2,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4.1-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "usr");
        assert_eq!(value["max_tokens"], 512);
    }
}
