// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod database;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod input;
pub mod models;
pub mod pipeline;
pub mod summarizer;
pub mod utils;

pub use config::{
    Config, EmbeddingConfig, ExtractionConfig, PipelineConfig, SearchConfig, SummarizerConfig,
    VectorStoreConfig,
};
pub use database::{
    AstraDbClient, CollectionManager, EmbeddingProvider, HashingEmbedder, InMemoryVectorStore,
    InsertOutcome, OpenAiEmbeddingClient, VectorStore,
};
pub use error::{PipelineError, Result};
pub use exporter::{SearchReport, SearchReportExporter};
pub use extractor::{MetadataExtractor, PdfTextExtractor, ResumeHeuristics, TextExtractor};
pub use input::{FileScanner, ScannedFile};
pub use models::{
    FileFailure, ResumeDocument, ResumeMetadata, SearchOutcome, SearchResult, SessionId,
    UploadReport, UploadedFile,
};
pub use pipeline::{HiringAssistant, ProgressTracker, SearchQuery, UploadStats};
pub use summarizer::{CompletionProvider, OpenAiCompletionClient, Summarizer};
pub use utils::{HealthReport, HealthStatus, RetryPolicy, ServiceCheck, StageTimer, Validator};
