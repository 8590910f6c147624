// file: src/database/insert.rs
// description: Astra DB batch insertion of resume documents with vector embeddings
// reference: https://docs.datastax.com/en/astra-db-serverless/api-reference/document-methods/insert-many.html

use crate::database::client::AstraDbClient;
use crate::database::store::InsertOutcome;
use crate::error::{PipelineError, Result};
use crate::models::ResumeDocument;
use serde_json::{Value, json};
use std::slice;
use tracing::{debug, info, warn};
use uuid::Uuid;

const DUPLICATE_ID: &str = "DOCUMENT_ALREADY_EXISTS";

pub struct BatchInserter<'a> {
    client: &'a AstraDbClient,
}

#[derive(Debug, Clone, Default)]
pub struct InsertStats {
    pub documents_inserted: usize,
    pub documents_failed: usize,
    pub batches: usize,
}

impl<'a> BatchInserter<'a> {
    pub fn new(client: &'a AstraDbClient) -> Self {
        Self { client }
    }

    /// Inserts documents in batches of the configured size. Ids are assigned
    /// before the first attempt so a retried batch cannot create duplicates.
    ///
    /// A failed batch is retried one document at a time, so one resume the
    /// embedding service or Astra DB rejects only fails itself. Batches
    /// already written stay written.
    pub async fn insert_documents(&self, documents: &[ResumeDocument]) -> InsertOutcome {
        let mut outcome = InsertOutcome::default();
        let mut stats = InsertStats::default();

        for batch in documents.chunks(self.client.batch_size().max(1)) {
            let batch_ids = batch
                .iter()
                .map(|_| Uuid::new_v4().to_string())
                .collect::<Vec<_>>();
            stats.batches += 1;

            match self.insert_batch(batch, &batch_ids).await {
                Ok(()) => {
                    stats.documents_inserted += batch.len();
                    outcome.results.extend(batch_ids.into_iter().map(Ok));
                }
                Err(e) if batch.len() > 1 => {
                    warn!(
                        "Batch of {} documents failed ({}); inserting them one by one",
                        batch.len(),
                        e
                    );
                    // Unordered inserts may have stored part of the batch;
                    // reusing the ids turns those into duplicates, not copies.
                    for (document, id) in batch.iter().zip(batch_ids) {
                        let result = self
                            .insert_batch(slice::from_ref(document), slice::from_ref(&id))
                            .await;
                        match result {
                            Ok(()) => {
                                stats.documents_inserted += 1;
                                outcome.results.push(Ok(id));
                            }
                            Err(e) => {
                                warn!("Could not store {}: {}", document.name(), e);
                                stats.documents_failed += 1;
                                outcome.results.push(Err(e.to_string()));
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!("Could not store {}: {}", batch[0].name(), e);
                    stats.documents_failed += batch.len();
                    outcome
                        .results
                        .extend(batch.iter().map(|_| Err(e.to_string())));
                }
            }
        }

        info!(
            "Inserted {} documents ({} failed) in {} batches into {}",
            stats.documents_inserted,
            stats.documents_failed,
            stats.batches,
            self.client.collection_name()
        );
        outcome
    }

    async fn insert_batch(&self, batch: &[ResumeDocument], ids: &[String]) -> Result<()> {
        let texts = batch.iter().map(|d| d.text.clone()).collect::<Vec<_>>();
        let vectors = self.client.embedder().embed(&texts).await?;

        if let Some(vector) = vectors.iter().find(|v| v.len() != self.client.dimension()) {
            return Err(PipelineError::embedding(
                format!(
                    "Embedding dimension {} does not match collection dimension {}",
                    vector.len(),
                    self.client.dimension()
                ),
                false,
            ));
        }

        let body = Self::insert_many_body(batch, ids, vectors)?;
        let response = self.client.command(&self.client.collection_url(), &body).await?;

        // A retried request may find its own documents already stored.
        let unexpected = response
            .errors
            .iter()
            .find(|e| e.error_code.as_deref() != Some(DUPLICATE_ID));

        if let Some(error) = unexpected {
            return Err(PipelineError::vector_store(
                format!("Failed to insert documents: {}", error.message),
                false,
            ));
        }

        debug!("Inserted batch of {} documents", batch.len());
        Ok(())
    }

    fn insert_many_body(
        batch: &[ResumeDocument],
        ids: &[String],
        vectors: Vec<Vec<f32>>,
    ) -> Result<Value> {
        let documents = batch
            .iter()
            .zip(ids)
            .zip(vectors)
            .map(|((document, id), vector)| {
                Ok(json!({
                    "_id": id,
                    "content": document.text,
                    "metadata": serde_json::to_value(&document.metadata)?,
                    "$vector": vector,
                }))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(json!({
            "insertMany": {
                "documents": documents,
                "options": {"ordered": false}
            }
        }))
    }
}
