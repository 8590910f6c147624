// file: src/database/client.rs
// description: Astra DB Data API client with command execution and vector search
// reference: https://docs.datastax.com/en/astra-db-serverless/api-reference/dataapiclient.html

use crate::config::{PipelineConfig, VectorStoreConfig};
use crate::database::embeddings::EmbeddingProvider;
use crate::database::insert::BatchInserter;
use crate::database::schema::CollectionManager;
use crate::database::store::{InsertOutcome, VectorStore};
use crate::error::{PipelineError, Result};
use crate::models::{ResumeDocument, ResumeMetadata, SearchResult};
use crate::utils::retry::{RetryPolicy, is_transient_request_error, is_transient_status};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

const TOKEN_HEADER: &str = "Token";

#[derive(Debug, Deserialize)]
pub(crate) struct CommandError {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "errorCode")]
    pub error_code: Option<String>,
}

/// Raw Data API response envelope.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CommandResponse {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<CommandError>,
}

#[derive(Debug, Deserialize)]
struct StoredRecord {
    #[serde(rename = "_id")]
    id: Value,
    #[serde(default)]
    content: String,
    #[serde(default)]
    metadata: ResumeMetadata,
    #[serde(rename = "$similarity", default)]
    similarity: f32,
}

#[derive(Clone)]
pub struct AstraDbClient {
    http: Client,
    config: VectorStoreConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    retry: RetryPolicy,
}

impl AstraDbClient {
    pub fn new(
        config: VectorStoreConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        pipeline: &PipelineConfig,
    ) -> Result<Self> {
        info!(
            "Using Astra DB collection {}.{} at {}",
            config.keyspace, config.collection_name, config.api_endpoint
        );

        let http = Client::builder()
            .timeout(pipeline.request_timeout())
            .build()
            .map_err(|e| PipelineError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            embedder,
            retry: RetryPolicy::from_config(pipeline),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn collection_name(&self) -> &str {
        &self.config.collection_name
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    pub(crate) fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    pub(crate) fn keyspace_url(&self) -> String {
        format!(
            "{}/api/json/v1/{}",
            self.config.api_endpoint.trim_end_matches('/'),
            self.config.keyspace
        )
    }

    pub(crate) fn collection_url(&self) -> String {
        format!("{}/{}", self.keyspace_url(), self.config.collection_name)
    }

    /// Posts one Data API command, retrying transient failures. Command-level
    /// errors are returned in the envelope for the caller to inspect.
    pub(crate) async fn command(&self, url: &str, body: &Value) -> Result<CommandResponse> {
        self.retry
            .run("astra command", move || self.send_command(url, body))
            .await
    }

    async fn send_command(&self, url: &str, body: &Value) -> Result<CommandResponse> {
        let response = self
            .http
            .post(url)
            .header(TOKEN_HEADER, &self.config.token)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                PipelineError::vector_store(
                    format!("Failed to reach Astra DB: {}", e),
                    is_transient_request_error(&e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::vector_store(
                format!("Astra DB request failed with status {}: {}", status, error_text),
                is_transient_status(status),
            ));
        }

        response.json::<CommandResponse>().await.map_err(|e| {
            PipelineError::vector_store(format!("Failed to parse Astra DB response: {}", e), false)
        })
    }

    /// Like [`command`](Self::command) but treats any command-level error as fatal.
    pub(crate) async fn command_ok(&self, url: &str, body: &Value) -> Result<CommandResponse> {
        let response = self.command(url, body).await?;
        if let Some(error) = response.errors.first() {
            return Err(PipelineError::vector_store(
                format!(
                    "Astra DB command failed ({}): {}",
                    error.error_code.as_deref().unwrap_or("UNKNOWN"),
                    error.message
                ),
                false,
            ));
        }
        Ok(response)
    }

    pub async fn list_collections(&self) -> Result<Vec<String>> {
        let response = self
            .command_ok(&self.keyspace_url(), &json!({"findCollections": {}}))
            .await?;

        let names = response
            .status
            .as_ref()
            .and_then(|s| s.get("collections"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(name) => Some(name.clone()),
                        Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(String::from),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(names)
    }
}

fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl VectorStore for AstraDbClient {
    async fn add_documents(&self, documents: &[ResumeDocument]) -> Result<InsertOutcome> {
        Ok(BatchInserter::new(self).insert_documents(documents).await)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        let query_vector = self.embedder.embed_one(query).await?;

        info!("Performing vector search with limit {}", k);

        let body = json!({
            "find": {
                "sort": {"$vector": query_vector},
                "projection": {"content": 1, "metadata": 1},
                "options": {"limit": k, "includeSimilarity": true}
            }
        });

        let response = self.command_ok(&self.collection_url(), &body).await?;

        let documents = response
            .data
            .and_then(|mut data| data.get_mut("documents").map(Value::take))
            .unwrap_or(Value::Array(Vec::new()));

        let records: Vec<StoredRecord> = serde_json::from_value(documents).map_err(|e| {
            PipelineError::vector_store(format!("Unexpected search result shape: {}", e), false)
        })?;

        let mut results = records
            .into_iter()
            .map(|record| {
                SearchResult::new(
                    id_to_string(&record.id),
                    ResumeDocument {
                        text: record.content,
                        metadata: record.metadata,
                    },
                    record.similarity,
                )
            })
            .collect::<Vec<_>>();

        if results.len() > k {
            warn!("Astra DB returned {} results for limit {}", results.len(), k);
            results.truncate(k);
        }

        info!("Vector search returned {} results", results.len());
        Ok(results)
    }

    async fn ping(&self) -> Result<bool> {
        debug!("Checking Astra DB connection");
        self.list_collections().await?;
        info!("Astra DB connection successful");
        Ok(true)
    }

    async fn document_count(&self) -> Result<u64> {
        let response = self
            .command_ok(&self.collection_url(), &json!({"countDocuments": {}}))
            .await?;

        Ok(response
            .status
            .as_ref()
            .and_then(|s| s.get("count"))
            .and_then(Value::as_u64)
            .unwrap_or(0))
    }

    async fn ensure_collection(&self) -> Result<()> {
        CollectionManager::new(self).initialize().await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::memory::HashingEmbedder;
    use mockito::Matcher;
    use std::time::Duration;

    pub(crate) fn client_for(server: &mockito::ServerGuard) -> AstraDbClient {
        client_with_embedder(server, Arc::new(HashingEmbedder::new(8)))
    }

    pub(crate) fn client_with_embedder(
        server: &mockito::ServerGuard,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AstraDbClient {
        let config = VectorStoreConfig {
            api_endpoint: server.url(),
            token: "AstraCS:test".to_string(),
            keyspace: "default_keyspace".to_string(),
            collection_name: "hiring_assistant".to_string(),
            dimension: 8,
            batch_size: 2,
        };
        AstraDbClient::new(config, embedder, &PipelineConfig::default())
            .unwrap()
            .with_retry(RetryPolicy::new(2, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_search_parses_documents() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/json/v1/default_keyspace/hiring_assistant")
            .match_header("token", "AstraCS:test")
            .match_body(Matcher::PartialJson(json!({
                "find": {"options": {"limit": 5, "includeSimilarity": true}}
            })))
            .with_status(200)
            .with_body(
                json!({
                    "data": {
                        "documents": [{
                            "_id": "doc-1",
                            "content": "5 years of experience in Python and AWS development",
                            "metadata": {
                                "name": "a.pdf",
                                "size": 100,
                                "session_id": "s1",
                                "years_of_experience": "5",
                                "key_skills": "Python, AWS",
                                "description": "5 years of experience"
                            },
                            "$similarity": 0.93
                        }],
                        "nextPageState": null
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let results = client
            .similarity_search_with_score("Python AWS", 5)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "doc-1");
        assert_eq!(results[0].document.metadata.years_of_experience, "5");
        assert!((results[0].score - 0.93).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_command_error_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/json/v1/default_keyspace/hiring_assistant")
            .with_status(200)
            .with_body(
                json!({"errors": [{"message": "Collection does not exist", "errorCode": "COLLECTION_NOT_EXIST"}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.document_count().await.unwrap_err();
        assert!(err.to_string().contains("COLLECTION_NOT_EXIST"));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_unauthorized_is_permanent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/json/v1/default_keyspace")
            .with_status(401)
            .with_body("bad token")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(client.ping().await.is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_document_count() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/json/v1/default_keyspace/hiring_assistant")
            .match_body(Matcher::Json(json!({"countDocuments": {}})))
            .with_status(200)
            .with_body(json!({"status": {"count": 12}}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.document_count().await.unwrap(), 12);
    }
}
