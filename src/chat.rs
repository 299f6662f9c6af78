//! Chat session: routes user input to a tool call or to the completion API

use std::fmt;

use crate::client::McpClient;
use crate::completion::ChatCompletion;
use crate::error::Error;
use crate::intent::Intent;

const MISSING_API_KEY: &str = "需要 DeepSeek API 密钥来处理此消息";

/// One rendered answer to a user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    Reply(String),
    Failure(String),
}

impl Turn {
    pub fn text(&self) -> &str {
        match self {
            Turn::Reply(text) | Turn::Failure(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Turn::Failure(_))
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

pub struct ChatSession {
    client: McpClient,
    completion: Box<dyn ChatCompletion>,
    api_key: Option<String>,
}

impl ChatSession {
    pub fn new(client: McpClient, completion: impl ChatCompletion + 'static) -> Self {
        Self {
            client,
            completion: Box::new(completion),
            api_key: None,
        }
    }

    /// Key for the completion fallback. Blank keys count as absent.
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn client(&self) -> &McpClient {
        &self.client
    }

    /// Handle one line of user input. Blank input produces no turn.
    pub async fn submit(&self, text: &str) -> Option<Turn> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let turn = match Intent::parse(text) {
            Some(intent) => self.call_tool(intent).await,
            None => self.complete(text).await,
        };
        Some(turn)
    }

    async fn call_tool(&self, intent: Intent) -> Turn {
        tracing::debug!(tool = intent.tool_name(), "Routing input to tool");
        match self.client.call(intent).await {
            Ok(result) if result.is_error => {
                Turn::Failure(format!("MCP 工具执行失败:\n{}", result.joined_text()))
            }
            Ok(result) => Turn::Reply(format!("MCP 工具结果:\n{}", result.joined_text())),
            Err(Error::JsonRpc(e)) => Turn::Failure(format!("MCP 错误: {}", e.message)),
            Err(e) => Turn::Failure(format!("处理消息时出错: {}", e)),
        }
    }

    async fn complete(&self, text: &str) -> Turn {
        let Some(api_key) = &self.api_key else {
            return Turn::Failure(MISSING_API_KEY.to_string());
        };
        match self.completion.complete(text, api_key).await {
            Ok(reply) => Turn::Reply(reply),
            Err(e) => Turn::Failure(format!("处理消息时出错: {}", e)),
        }
    }
}
