//! LLM client: OpenAI-compatible chat completions, text output only.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::session::ChatMessage;

/// One request message in OpenAI chat format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireMessage {
    /// "developer", "user" or "assistant".
    pub role: String,
    pub content: String,
}

impl WireMessage {
    pub fn developer(content: impl Into<String>) -> Self {
        Self {
            role: "developer".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

/// One completion call: credential plus the assembled message list.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub api_key: String,
    pub messages: Vec<WireMessage>,
}

/// Completion service seam so the requester can run against `LlmClient` or test doubles.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Return the raw text content of the first choice.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    typ: &'static str,
}

/// Request body for chat completions (OpenAI format).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    response_format: ResponseFormat,
    verbosity: &'static str,
    reasoning_effort: &'static str,
    store: bool,
}

/// Response: choices[0].message.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for chat completions.
pub struct LlmClient {
    client: reqwest::Client,
    inference_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(inference_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            inference_url,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionService for LlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: &request.messages,
            response_format: ResponseFormat { typ: "text" },
            verbosity: "medium",
            reasoning_effort: "medium",
            store: false,
        };
        let res = self
            .client
            .post(&self.inference_url)
            .bearer_auth(&request.api_key)
            .json(&body)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("LLM API error {}: {}", status, text));
        }
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("LLM response parse error: {}; body: {}", e, text))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("LLM response has no choices"))?;
        choice
            .message
            .content
            .ok_or_else(|| anyhow::anyhow!("LLM response has no text content"))
    }
}
