// file: src/database/embeddings.rs
// description: OpenAI-compatible embeddings API integration for resume and query text
// reference: https://platform.openai.com/docs/api-reference/embeddings

use crate::config::{EmbeddingConfig, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::utils::retry::{RetryPolicy, is_transient_request_error, is_transient_status};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Text-in, vector-out capability used by the vector store adapters.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds each text; the output has one vector per input, in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::embedding("no embedding returned", false))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: Vec<&'a str>,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

pub struct OpenAiEmbeddingClient {
    client: Client,
    config: EmbeddingConfig,
    retry: RetryPolicy,
}

impl OpenAiEmbeddingClient {
    pub fn new(config: EmbeddingConfig, pipeline: &PipelineConfig) -> Result<Self> {
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

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));

        // The API rejects empty strings; an empty resume still gets a vector.
        let request = EmbeddingRequest {
            input: texts
                .iter()
                .map(|t| if t.trim().is_empty() { " " } else { t.as_str() })
                .collect(),
            model: &self.config.model,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                PipelineError::embedding(
                    format!("Failed to send embeddings request: {}", e),
                    is_transient_request_error(&e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::embedding(
                format!(
                    "Embeddings request failed with status {}: {}",
                    status, error_text
                ),
                is_transient_status(status),
            ));
        }

        let mut body: EmbeddingResponse = response.json().await.map_err(|e| {
            PipelineError::embedding(format!("Failed to parse embeddings response: {}", e), false)
        })?;

        if body.data.len() != texts.len() {
            return Err(PipelineError::embedding(
                format!(
                    "Expected {} embeddings, received {}",
                    texts.len(),
                    body.data.len()
                ),
                false,
            ));
        }

        body.data.sort_by_key(|d| d.index);
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Requesting {} embeddings from {}", texts.len(), self.config.model);
        self.retry
            .run("embeddings", move || self.request(texts))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    fn client_for(server: &mockito::ServerGuard) -> OpenAiEmbeddingClient {
        let config = EmbeddingConfig {
            base_url: server.url(),
            api_key: "sk-test".to_string(),
            model: "text-embedding-ada-002".to_string(),
        };
        OpenAiEmbeddingClient::new(config, &PipelineConfig::default())
            .unwrap()
            .with_retry(RetryPolicy::new(3, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_embed_orders_by_index() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({"model": "text-embedding-ada-002"})))
            .with_status(200)
            .with_body(
                json!({
                    "data": [
                        {"embedding": [0.0, 1.0], "index": 1},
                        {"embedding": [1.0, 0.0], "index": 0}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let vectors = client
            .embed(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_empty_text_sent_as_space() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .match_body(Matcher::PartialJson(json!({"input": [" "]})))
            .with_status(200)
            .with_body(json!({"data": [{"embedding": [0.5], "index": 0}]}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let vector = client.embed_one("").await.unwrap();

        mock.assert_async().await;
        assert_eq!(vector, vec![0.5]);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .with_status(503)
            .with_body("unavailable")
            .expect(3)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.embed_one("query").await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, PipelineError::Embedding { transient: true, .. }));
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .with_status(401)
            .with_body("invalid key")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.embed_one("query").await.unwrap_err();

        mock.assert_async().await;
        assert!(err.to_string().contains("401"));
    }
}
