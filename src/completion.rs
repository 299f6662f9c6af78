//! Chat-completion fallback for input that is not a tool intent

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_API_BASE: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// A remote chat-completion service
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send one user message and return the assistant's reply text
    async fn complete(&self, message: &str, api_key: &str) -> Result<String>;
}

/// OpenAI-compatible client for the DeepSeek chat API
pub struct DeepSeekClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl Default for DeepSeekClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DeepSeekClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionReply,
}

#[derive(Debug, Deserialize)]
struct CompletionReply {
    content: Option<String>,
}

#[async_trait]
impl ChatCompletion for DeepSeekClient {
    async fn complete(&self, message: &str, api_key: &str) -> Result<String> {
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![CompletionMessage {
                role: "user",
                content: message,
            }],
            stream: false,
        };

        tracing::debug!(model = %self.model, "Sending chat completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Completion(format!("API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Chat completion rejected");
            return Err(Error::Completion(format!("API request failed: {}", status)));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Completion(format!("Invalid API response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Completion("API response contained no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let request = CompletionRequest {
            model: DEFAULT_MODEL,
            messages: vec![CompletionMessage {
                role: "user",
                content: "hi",
            }],
            stream: false,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "deepseek-chat",
                "messages": [{"role": "user", "content": "hi"}],
                "stream": false
            })
        );
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            DeepSeekClient::new().endpoint(),
            "https://api.deepseek.com/v1/chat/completions"
        );
        assert_eq!(
            DeepSeekClient::with_base_url("http://127.0.0.1:9/").endpoint(),
            "http://127.0.0.1:9/v1/chat/completions"
        );
    }

    #[test]
    fn test_response_parsing() {
        let parsed: CompletionResponse = serde_json::from_value(json!({
            "id": "x",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "hello"}}]
        }))
        .unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_completion_error() {
        let client = DeepSeekClient::with_base_url("http://127.0.0.1:9");
        let err = client.complete("hi", "key").await.unwrap_err();
        assert!(matches!(err, Error::Completion(_)));
    }
}
