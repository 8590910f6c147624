// file: src/summarizer/completion.rs
// description: OpenAI-compatible chat completion client used for summarization
// reference: https://platform.openai.com/docs/api-reference/chat

use crate::config::{PipelineConfig, SummarizerConfig};
use crate::error::{PipelineError, Result};
use crate::utils::retry::{RetryPolicy, is_transient_request_error, is_transient_status};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiCompletionClient {
    client: Client,
    config: SummarizerConfig,
    retry: RetryPolicy,
}

impl OpenAiCompletionClient {
    pub fn new(config: SummarizerConfig, pipeline: &PipelineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(pipeline.request_timeout())
            .build()
            .map_err(|e| PipelineError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            retry: RetryPolicy::from_config(pipeline),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                PipelineError::summarization(
                    format!("Failed to send completion request: {}", e),
                    is_transient_request_error(&e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::summarization(
                format!(
                    "Completion request failed with status {}: {}",
                    status, error_text
                ),
                is_transient_status(status),
            ));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            PipelineError::summarization(
                format!("Failed to parse completion response: {}", e),
                false,
            )
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| PipelineError::summarization("Model returned empty content", false))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            "Requesting completion from {} ({} chars)",
            self.config.model,
            prompt.len()
        );
        self.retry
            .run("completion", move || self.request(prompt))
            .await
    }
}
