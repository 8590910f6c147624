// file: src/database/memory.rs
// description: in-process vector store and hashing embedder for tests and local experiments
// reference: https://docs.rs/tokio/latest/tokio/sync/struct.RwLock.html

use crate::database::embeddings::EmbeddingProvider;
use crate::database::store::{InsertOutcome, VectorStore, similarity_score};
use crate::error::Result;
use crate::models::{ResumeDocument, SearchResult};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Deterministic bag-of-words embedder: lowercase tokens are hashed into a
/// fixed number of buckets and the vector is L2-normalized.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

struct StoredDocument {
    id: String,
    document: ResumeDocument,
    vector: Vec<f32>,
}

pub struct InMemoryVectorStore {
    embedder: Arc<dyn EmbeddingProvider>,
    documents: RwLock<Vec<StoredDocument>>,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            documents: RwLock::new(Vec::new()),
        }
    }

    pub async fn documents(&self) -> Vec<ResumeDocument> {
        self.documents
            .read()
            .await
            .iter()
            .map(|stored| stored.document.clone())
            .collect()
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new(Arc::new(HashingEmbedder::default()))
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_documents(&self, documents: &[ResumeDocument]) -> Result<InsertOutcome> {
        let texts = documents.iter().map(|d| d.text.clone()).collect::<Vec<_>>();
        let vectors = self.embedder.embed(&texts).await?;

        let mut stored = self.documents.write().await;
        let mut ids = Vec::with_capacity(documents.len());

        for (document, vector) in documents.iter().zip(vectors) {
            let id = Uuid::new_v4().to_string();
            ids.push(id.clone());
            stored.push(StoredDocument {
                id,
                document: document.clone(),
                vector,
            });
        }

        debug!("Stored {} documents in memory", ids.len());
        Ok(InsertOutcome::all_stored(ids))
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        let query_vector = self.embedder.embed_one(query).await?;
        let stored = self.documents.read().await;

        let mut results = stored
            .iter()
            .map(|s| {
                SearchResult::new(
                    s.id.clone(),
                    s.document.clone(),
                    similarity_score(&query_vector, &s.vector),
                )
            })
            .collect::<Vec<_>>();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        Ok(results)
    }

    async fn ping(&self) -> Result<bool> {
        Ok(true)
    }

    async fn document_count(&self) -> Result<u64> {
        Ok(self.documents.read().await.len() as u64)
    }
}
