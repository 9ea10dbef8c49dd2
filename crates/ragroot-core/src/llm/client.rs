//! HTTP client for external completion services (vLLM, OpenAI, Ollama, etc.)

use crate::config::CompletionServiceConfig;
use crate::error::{RagRootError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Trait for text-completion service clients
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a chat completion
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<Completion>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Chat message for completion requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
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

/// Completion result with provider metadata
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

/// OpenAI-compatible completion client
pub struct HttpCompletionClient {
    http_client: reqwest::Client,
    config: CompletionServiceConfig,
}

impl HttpCompletionClient {
    /// Create new client from configuration
    pub fn new(config: CompletionServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RagRootError::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(CompletionServiceConfig::default())
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<Completion> {
        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
            #[serde(default)]
            usage: Option<Usage>,
            #[serde(default)]
            model: Option<String>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        #[derive(Deserialize)]
        struct Usage {
            prompt_tokens: Option<u32>,
            completion_tokens: Option<u32>,
        }

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: 0.7,
            max_tokens: 1024,
        };

        let url = format!("{}/v1/chat/completions", self.config.url);

        let mut req = self.http_client.post(&url).json(&request);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await.map_err(RagRootError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagRootError::Completion(format!(
                "completion service error (HTTP {}): {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(RagRootError::Http)?;

        let text = chat_response
            .choices
            .first()
            .ok_or_else(|| RagRootError::Completion("no choices in response".to_string()))?
            .message
            .content
            .clone();

        let (prompt_tokens, completion_tokens) = chat_response
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((None, None));

        Ok(Completion {
            text,
            model: chat_response.model.unwrap_or_else(|| self.config.model.clone()),
            prompt_tokens,
            completion_tokens,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
