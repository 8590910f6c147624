// file: src/pipeline/orchestrator.rs
// description: coordinates resume upload, similarity search and on-demand summaries
// reference: orchestrates asynchronous ingestion and retrieval workflow

use crate::config::{Config, SearchConfig};
use crate::database::{AstraDbClient, EmbeddingProvider, OpenAiEmbeddingClient, VectorStore};
use crate::error::{PipelineError, Result};
use crate::extractor::{MetadataExtractor, PdfTextExtractor, TextExtractor};
use crate::models::{
    FileFailure, ResumeDocument, SearchOutcome, SessionId, UploadReport, UploadedFile,
};
use crate::pipeline::progress::ProgressTracker;
use crate::summarizer::Summarizer;
use crate::utils::telemetry::{HealthReport, ServiceCheck, StageTimer};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const SLOW_SUMMARY: Duration = Duration::from_secs(30);

/// Free-text job description plus an optional list of key skills.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub job_description: String,
    pub key_skills: String,
}

impl SearchQuery {
    pub fn new(job_description: impl Into<String>, key_skills: impl Into<String>) -> Self {
        Self {
            job_description: job_description.into(),
            key_skills: key_skills.into(),
        }
    }

    /// The text embedded for the search: description then skills.
    pub fn text(&self) -> String {
        format!("{} {}", self.job_description.trim(), self.key_skills.trim())
            .trim()
            .to_string()
    }
}

pub struct HiringAssistant {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    summarizer: Summarizer,
    extractor: Arc<dyn TextExtractor>,
    metadata: MetadataExtractor,
    search: SearchConfig,
    collection_name: String,
    parallel_workers: usize,
}

impl HiringAssistant {
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbeddingClient::new(
            config.embeddings.clone(),
            &config.pipeline,
        )?);
        let store = Arc::new(AstraDbClient::new(
            config.vector_store.clone(),
            embedder.clone(),
            &config.pipeline,
        )?);
        let summarizer = Summarizer::from_config(&config.summarizer, &config.pipeline)?;

        Self::new(config, store, embedder, summarizer)
    }

    /// Builds an assistant over injected services.
    pub fn new(
        config: &Config,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        summarizer: Summarizer,
    ) -> Result<Self> {
        Ok(Self {
            store,
            embedder,
            summarizer,
            extractor: Arc::new(PdfTextExtractor::new()),
            metadata: MetadataExtractor::from_config(&config.extraction)?,
            search: config.search.clone(),
            collection_name: config.vector_store.collection_name.clone(),
            parallel_workers: config.pipeline.parallel_workers.max(1),
        })
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn score_threshold(&self) -> f32 {
        self.search.score_threshold
    }

    pub async fn upload(&self, files: Vec<UploadedFile>) -> Result<UploadReport> {
        let progress = ProgressTracker::hidden(files.len());
        self.upload_with_progress(files, &progress).await
    }

    /// Extracts, annotates and stores one batch of resumes under a fresh
    /// session id. A file that fails extraction or storage is reported in
    /// the returned report; the rest of the batch is still stored.
    pub async fn upload_with_progress(
        &self,
        files: Vec<UploadedFile>,
        progress: &ProgressTracker,
    ) -> Result<UploadReport> {
        if files.is_empty() {
            return Err(PipelineError::Validation(
                "No files provided for upload".to_string(),
            ));
        }

        let session_id = SessionId::generate();
        let mut timer = StageTimer::start(format!("upload {}", session_id));
        info!(
            "Uploading {} files in session {} with {} workers",
            files.len(),
            session_id,
            self.parallel_workers
        );

        let mut prepared: Vec<(usize, std::result::Result<ResumeDocument, FileFailure>)> =
            stream::iter(files.into_iter().enumerate())
                .map(|(index, file)| {
                    let session_id = &session_id;
                    async move { (index, self.prepare(file, session_id, progress).await) }
                })
                .buffer_unordered(self.parallel_workers)
                .collect()
                .await;
        prepared.sort_by_key(|(index, _)| *index);

        let mut documents = Vec::new();
        let mut failures = Vec::new();
        for (_, outcome) in prepared {
            match outcome {
                Ok(document) => documents.push(document),
                Err(failure) => failures.push(failure),
            }
        }

        if documents.is_empty() {
            warn!("No resumes could be extracted; nothing stored");
            timer.finish("extract");
            return Ok(UploadReport {
                session_id,
                document_ids: Vec::new(),
                failures,
            });
        }

        timer.stage("extract");
        progress.storing(documents.len());
        let outcome = self.store.add_documents(&documents).await?;

        let mut document_ids = Vec::with_capacity(documents.len());
        for (document, result) in documents.into_iter().zip(outcome.results) {
            match result {
                Ok(id) => document_ids.push(id),
                Err(error) => failures.push(FileFailure {
                    name: document.metadata.name,
                    error,
                }),
            }
        }
        progress.documents_stored(document_ids.len());

        timer.finish("store");
        Ok(UploadReport {
            session_id,
            document_ids,
            failures,
        })
    }

    async fn prepare(
        &self,
        file: UploadedFile,
        session_id: &SessionId,
        progress: &ProgressTracker,
    ) -> std::result::Result<ResumeDocument, FileFailure> {
        progress.file_started(&file.name);
        let size = file.size();
        let UploadedFile { name, bytes } = file;

        match self.extractor.extract_text(name.clone(), bytes).await {
            Ok(text) => {
                let heuristics = self.metadata.extract(&text);
                progress.file_extracted(size);
                let document = ResumeDocument::assemble(text, heuristics, name, size, session_id);
                if document.is_empty() {
                    warn!("{} has no text layer; storing placeholders", document.name());
                }
                Ok(document)
            }
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                progress.file_unreadable();
                Err(FileFailure {
                    name,
                    error: e.to_string(),
                })
            }
        }
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome> {
        self.search_with_limit(query, self.search.top_k).await
    }

    /// Retrieves the `limit` nearest resumes and keeps only those scoring
    /// strictly above the configured threshold.
    pub async fn search_with_limit(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<SearchOutcome> {
        let text = query.text();
        if text.is_empty() {
            return Err(PipelineError::Validation(
                "Provide a job description or key skills to search".to_string(),
            ));
        }
        if limit == 0 {
            return Err(PipelineError::Validation(
                "Search limit must be greater than zero".to_string(),
            ));
        }

        let candidates = self.store.similarity_search_with_score(&text, limit).await?;
        let outcome = SearchOutcome::from_candidates(candidates, self.search.score_threshold);

        match &outcome {
            SearchOutcome::Matches(matches) => {
                info!("{} resumes passed the relevance threshold", matches.len())
            }
            SearchOutcome::NoMatches {
                threshold,
                candidates_considered,
            } => info!(
                "None of {} candidates scored above {:.2}",
                candidates_considered, threshold
            ),
        }
        Ok(outcome)
    }

    pub async fn summarize(&self, document: &ResumeDocument) -> Result<String> {
        let timer = StageTimer::start(format!("summary of {}", document.name()));
        let summary = self.summarizer.summarize(document).await;
        timer.warn_if_over(SLOW_SUMMARY);
        timer.finish("map-reduce");
        summary
    }

    /// Checks the vector store and the embedding service, optionally creating
    /// the collection first.
    pub async fn verify(&self, create_collection: bool) -> HealthReport {
        let collection = if create_collection {
            Some(ServiceCheck::probe(self.store.ensure_collection(), |_| None).await)
        } else {
            None
        };

        let vector_store = ServiceCheck::probe(self.store.ping(), |ready: &bool| {
            (!ready).then(|| "store reachable but not ready".to_string())
        })
        .await;

        let embeddings = ServiceCheck::probe(
            self.embedder.embed_one("health check"),
            |vector: &Vec<f32>| {
                vector
                    .is_empty()
                    .then(|| "empty embedding returned".to_string())
            },
        )
        .await;

        HealthReport {
            collection_name: self.collection_name.clone(),
            collection,
            vector_store,
            embeddings,
            checked_at: Utc::now(),
        }
    }

    pub async fn document_count(&self) -> Result<u64> {
        self.store.document_count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::client::tests::client_for;
    use crate::database::{HashingEmbedder, InMemoryVectorStore};
    use crate::summarizer::CompletionProvider;
    use crate::utils::telemetry::HealthStatus;
    use async_trait::async_trait;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Treats the uploaded bytes as UTF-8 text; "corrupt" files fail.
    struct PlainTextExtractor;

    #[async_trait]
    impl TextExtractor for PlainTextExtractor {
        async fn extract_text(&self, name: String, bytes: Vec<u8>) -> Result<String> {
            let text = String::from_utf8_lossy(&bytes).to_string();
            if text.starts_with("corrupt") {
                return Err(PipelineError::Parse {
                    file: name,
                    message: "unreadable".to_string(),
                });
            }
            Ok(text)
        }
    }

    /// Counts vocabulary skills only, so a query naming the same skills as a
    /// resume lands on the same direction.
    struct SkillEmbedder;

    const SKILLS: [&str; 4] = ["python", "aws", "react", "sql"];

    #[async_trait]
    impl EmbeddingProvider for SkillEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let lower = text.to_lowercase();
                    SKILLS
                        .iter()
                        .map(|skill| if lower.contains(skill) { 1.0 } else { 0.0 })
                        .collect()
                })
                .collect())
        }
    }

    struct FixedSummary;

    #[async_trait]
    impl CompletionProvider for FixedSummary {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok("Backend engineer.".to_string())
        }
    }

    fn assistant_over(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> HiringAssistant {
        let config = Config::default();
        let summarizer = Summarizer::new(Arc::new(FixedSummary), &config.summarizer);
        HiringAssistant::new(&config, store, embedder, summarizer)
            .unwrap()
            .with_extractor(Arc::new(PlainTextExtractor))
    }

    fn assistant(embedder: Arc<dyn EmbeddingProvider>) -> (HiringAssistant, Arc<InMemoryVectorStore>) {
        let store = Arc::new(InMemoryVectorStore::new(embedder.clone()));
        (assistant_over(store.clone(), embedder), store)
    }

    fn padded(text: &str, size: usize) -> Vec<u8> {
        let mut bytes = text.as_bytes().to_vec();
        bytes.resize(size, b' ');
        bytes
    }

    #[tokio::test]
    async fn test_upload_shares_session_id() {
        let (assistant, store) = assistant(Arc::new(HashingEmbedder::default()));
        let files = vec![
            UploadedFile::new("a.pdf", padded("Resume A", 100)),
            UploadedFile::new("b.pdf", padded("Resume B", 200)),
            UploadedFile::new("c.pdf", padded("Resume C", 300)),
        ];

        let report = assistant.upload(files).await.unwrap();
        assert_eq!(report.uploaded(), 3);
        assert!(report.is_complete());

        let documents = store.documents().await;
        let summary = documents
            .iter()
            .map(|d| (d.metadata.name.as_str(), d.metadata.size))
            .collect::<Vec<_>>();
        assert_eq!(summary, vec![("a.pdf", 100), ("b.pdf", 200), ("c.pdf", 300)]);
        assert!(
            documents
                .iter()
                .all(|d| d.metadata.session_id == report.session_id.as_str())
        );
    }

    #[tokio::test]
    async fn test_sessions_differ_between_uploads() {
        let (assistant, _) = assistant(Arc::new(HashingEmbedder::default()));
        let first = assistant
            .upload(vec![UploadedFile::new("a.pdf", b"one".to_vec())])
            .await
            .unwrap();
        let second = assistant
            .upload(vec![UploadedFile::new("a.pdf", b"one".to_vec())])
            .await
            .unwrap();
        assert_ne!(first.session_id, second.session_id);
    }

    #[tokio::test]
    async fn test_failed_file_is_isolated() {
        let (assistant, store) = assistant(Arc::new(HashingEmbedder::default()));
        let files = vec![
            UploadedFile::new("good.pdf", b"3 years of experience with SQL".to_vec()),
            UploadedFile::new("bad.pdf", b"corrupt bytes".to_vec()),
        ];

        let report = assistant.upload(files).await.unwrap();

        assert_eq!(report.uploaded(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "bad.pdf");
        assert_eq!(store.documents().await[0].metadata.years_of_experience, "3");
    }

    #[tokio::test]
    async fn test_rejected_batch_reported_per_file() {
        let mut server = mockito::Server::new_async().await;
        let stored = server
            .mock("POST", "/api/json/v1/default_keyspace/hiring_assistant")
            .match_body(Matcher::Regex(r"a\.pdf".to_string()))
            .with_status(200)
            .with_body(json!({"status": {"insertedIds": []}}).to_string())
            .expect(1)
            .create_async()
            .await;
        let _rejected = server
            .mock("POST", "/api/json/v1/default_keyspace/hiring_assistant")
            .match_body(Matcher::Regex(r"c\.pdf".to_string()))
            .with_status(200)
            .with_body(json!({"errors": [{"message": "boom", "errorCode": "SERVER_UNHANDLED_ERROR"}]}).to_string())
            .create_async()
            .await;

        // Batches of two: [a.pdf, b.pdf] is stored, [c.pdf] is rejected.
        let assistant = assistant_over(
            Arc::new(client_for(&server)),
            Arc::new(HashingEmbedder::new(8)),
        );
        let report = assistant
            .upload(vec![
                UploadedFile::new("a.pdf", b"Resume A".to_vec()),
                UploadedFile::new("b.pdf", b"Resume B".to_vec()),
                UploadedFile::new("c.pdf", b"Resume C".to_vec()),
            ])
            .await
            .unwrap();

        stored.assert_async().await;
        assert_eq!(report.uploaded(), 2);
        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "c.pdf");
        assert!(report.failures[0].error.contains("boom"));
        assert!(!report.session_id.as_str().is_empty());
    }

    #[tokio::test]
    async fn test_all_failed_upload_stores_nothing() {
        let (assistant, store) = assistant(Arc::new(HashingEmbedder::default()));
        let report = assistant
            .upload(vec![UploadedFile::new("bad.pdf", b"corrupt".to_vec())])
            .await
            .unwrap();

        assert_eq!(report.uploaded(), 0);
        assert_eq!(report.failures.len(), 1);
        assert!(store.documents().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let (assistant, _) = assistant(Arc::new(HashingEmbedder::default()));
        let result = assistant.upload(Vec::new()).await;
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_search_finds_python_aws_resume() {
        let (assistant, _) = assistant(Arc::new(SkillEmbedder));
        assistant
            .upload(vec![UploadedFile::new(
                "dev.pdf",
                b"5 years of experience in Python and AWS development".to_vec(),
            )])
            .await
            .unwrap();

        let outcome = assistant
            .search(&SearchQuery::new("Python AWS", ""))
            .await
            .unwrap();

        let matches = outcome.matches();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].document.metadata.years_of_experience, "5");
        assert!(matches[0].document.metadata.key_skills.contains("Python"));
        assert!(matches[0].document.metadata.key_skills.contains("AWS"));
        assert!(matches[0].score > 0.90);
    }

    #[tokio::test]
    async fn test_search_round_trip_own_text() {
        let (assistant, _) = assistant(Arc::new(HashingEmbedder::default()));
        let text = "Data engineer with Spark pipelines and 7 years of experience";
        assistant
            .upload(vec![
                UploadedFile::new("match.pdf", text.as_bytes().to_vec()),
                UploadedFile::new("other.pdf", b"Pastry chef and bakery owner".to_vec()),
            ])
            .await
            .unwrap();

        let outcome = assistant
            .search(&SearchQuery::new(text, ""))
            .await
            .unwrap();

        let top = &outcome.matches()[0];
        assert_eq!(top.document.metadata.name, "match.pdf");
        assert!(top.score > 0.90);
    }

    #[tokio::test]
    async fn test_search_without_relevant_resumes() {
        let (assistant, _) = assistant(Arc::new(SkillEmbedder));
        assistant
            .upload(vec![UploadedFile::new("sql.pdf", b"SQL reporting".to_vec())])
            .await
            .unwrap();

        let outcome = assistant
            .search(&SearchQuery::new("React", ""))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SearchOutcome::NoMatches {
                threshold: 0.90,
                candidates_considered: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let (assistant, _) = assistant(Arc::new(HashingEmbedder::default()));
        let result = assistant.search(&SearchQuery::new("  ", "\n")).await;
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_summarize_and_verify() {
        let (assistant, _) = assistant(Arc::new(HashingEmbedder::default()));
        let document = ResumeDocument {
            text: "Go and Kubernetes".to_string(),
            metadata: Default::default(),
        };

        assert_eq!(assistant.summarize(&document).await.unwrap(), "Backend engineer.");

        let report = assistant.verify(true).await;
        assert_eq!(report.overall_status(), HealthStatus::Healthy);
        assert!(report.collection.is_some());
        assert_eq!(report.checks().count(), 3);
        assert!(assistant.verify(false).await.collection.is_none());
    }

    #[test]
    fn test_query_text() {
        assert_eq!(SearchQuery::new(" Backend dev ", "Rust").text(), "Backend dev Rust");
        assert_eq!(SearchQuery::new("", "Rust, SQL").text(), "Rust, SQL");
    }
}
