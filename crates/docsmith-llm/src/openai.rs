//! OpenAI-compatible hosted backend
//!
//! Covers hosted chat-completions APIs that share the OpenAI wire format
//! (OpenAI itself, DeepSeek). Non-streaming: the pipeline wants one complete
//! response per chunk, not tokens.

use crate::BackendError;
use async_trait::async_trait;
use docsmith_domain::CompletionBackend;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default timeout for hosted completion requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Sampling temperature; extraction wants near-deterministic output
const TEMPERATURE: f64 = 0.1;

/// Backend for hosted OpenAI-compatible chat APIs
pub struct OpenAiCompatBackend {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
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

impl OpenAiCompatBackend {
    /// Create a new hosted backend
    ///
    /// # Parameters
    ///
    /// - `base_url`: API base (e.g. "https://api.openai.com/v1")
    /// - `model`: model identifier (e.g. "gpt-4o-mini", "deepseek-chat")
    /// - `api_key`: bearer credential
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("reqwest client construction cannot fail with static config");

        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
            client,
        }
    }

    async fn chat(&self, system: &str, content: &str) -> Result<String, BackendError> {
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let request_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: content.to_string(),
                },
            ],
            temperature: TEMPERATURE,
            stream: false,
        };

        debug!("chat request to {} with model {}", url, self.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BackendError::Communication(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(BackendError::Status { status, message });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("failed to parse response: {}", e)))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::InvalidResponse("response carried no choices".to_string()))?;

        Ok(choice.message.content)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatBackend {
    type Error = BackendError;

    async fn complete(
        &self,
        system_instruction: &str,
        content: &str,
    ) -> Result<String, Self::Error> {
        self.chat(system_instruction, content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_creation() {
        let backend =
            OpenAiCompatBackend::new("https://api.deepseek.com/v1", "deepseek-chat", "sk-test");
        assert_eq!(backend.base_url, "https://api.deepseek.com/v1");
        assert_eq!(backend.model, "deepseek-chat");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_communication_error() {
        let backend = OpenAiCompatBackend::new("http://127.0.0.1:9", "gpt-4o-mini", "sk-test");
        let result = backend.complete("sys", "test").await;
        assert!(matches!(result, Err(BackendError::Communication(_))));
    }
}
