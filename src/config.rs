// file: src/config.rs
// description: application configuration management with toml and environment support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::extractor::patterns::{DEFAULT_EXPERIENCE_PATTERN, DEFAULT_SKILLS};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_ASTRA_ENDPOINT: &str = "ASTRA_DB_API_ENDPOINT";
pub const ENV_ASTRA_TOKEN: &str = "ASTRA_DB_APPLICATION_TOKEN";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub vector_store: VectorStoreConfig,
    pub embeddings: EmbeddingConfig,
    pub summarizer: SummarizerConfig,
    pub search: SearchConfig,
    pub pipeline: PipelineConfig,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub api_endpoint: String,
    pub token: String,
    pub keyspace: String,
    pub collection_name: String,
    pub dimension: usize,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub chunk_size_words: usize,
    pub chunk_overlap_words: usize,
    pub max_collapse_depth: usize,
    pub parallel_requests: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    pub top_k: usize,
    pub score_threshold: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub parallel_workers: usize,
    pub skip_patterns: Vec<String>,
    pub max_file_size_mb: usize,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub description_words: usize,
    pub rules: Vec<MetadataRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    YearsOfExperience,
    KeySkills,
}

/// One row of the metadata rule table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetadataRule {
    /// First capture group of the first match fills the field.
    FirstMatch { field: MetadataField, pattern: String },
    /// Every vocabulary term found as a whole word fills the field.
    Vocabulary {
        field: MetadataField,
        terms: Vec<String>,
    },
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            api_endpoint: String::new(),
            token: String::new(),
            keyspace: "default_keyspace".to_string(),
            collection_name: "hiring_assistant".to_string(),
            dimension: 1536,
            batch_size: 20,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "text-embedding-ada-002".to_string(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.5,
            max_tokens: 2000,
            chunk_size_words: 1000,
            chunk_overlap_words: 50,
            max_collapse_depth: 3,
            parallel_requests: 4,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            score_threshold: 0.90,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            skip_patterns: vec![".git/*".to_string()],
            max_file_size_mb: 20,
            request_timeout_secs: 60,
            max_retries: 3,
            retry_base_delay_ms: 500,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            description_words: 100,
            rules: vec![
                MetadataRule::FirstMatch {
                    field: MetadataField::YearsOfExperience,
                    pattern: DEFAULT_EXPERIENCE_PATTERN.to_string(),
                },
                MetadataRule::Vocabulary {
                    field: MetadataField::KeySkills,
                    terms: DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
                },
            ],
        }
    }
}

impl PipelineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Loads and validates configuration. A missing endpoint or credential is
    /// reported here, before any command touches the network.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path)),
            None => builder.add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false)),
        };

        builder = builder.add_source(
            config::Environment::with_prefix("HIRING_ASSISTANT")
                .separator("__")
                .try_parsing(true),
        );

        let openai_key = std::env::var(ENV_OPENAI_API_KEY).ok();
        builder = builder
            .set_override_option("vector_store.api_endpoint", std::env::var(ENV_ASTRA_ENDPOINT).ok())
            .and_then(|b| {
                b.set_override_option("vector_store.token", std::env::var(ENV_ASTRA_TOKEN).ok())
            })
            .and_then(|b| b.set_override_option("embeddings.api_key", openai_key.clone()))
            .and_then(|b| b.set_override_option("summarizer.api_key", openai_key))
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vector_store.api_endpoint.trim().is_empty() {
            return Err(PipelineError::Config(format!(
                "vector store endpoint is not set (export {})",
                ENV_ASTRA_ENDPOINT
            )));
        }

        if self.vector_store.token.trim().is_empty() {
            return Err(PipelineError::Config(format!(
                "vector store token is not set (export {})",
                ENV_ASTRA_TOKEN
            )));
        }

        if self.embeddings.api_key.trim().is_empty() || self.summarizer.api_key.trim().is_empty()
        {
            return Err(PipelineError::Config(format!(
                "model API key is not set (export {})",
                ENV_OPENAI_API_KEY
            )));
        }

        for (name, url) in [
            ("vector_store.api_endpoint", &self.vector_store.api_endpoint),
            ("embeddings.base_url", &self.embeddings.base_url),
            ("summarizer.base_url", &self.summarizer.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(PipelineError::Config(format!(
                    "{} must be an http(s) URL, got {}",
                    name, url
                )));
            }
        }

        if self.pipeline.parallel_workers == 0 {
            return Err(PipelineError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.vector_store.batch_size == 0 {
            return Err(PipelineError::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        if self.search.top_k == 0 {
            return Err(PipelineError::Config(
                "top_k must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.search.score_threshold) {
            return Err(PipelineError::Config(
                "score_threshold must be within [0, 1]".to_string(),
            ));
        }

        if self.summarizer.chunk_size_words == 0
            || self.summarizer.chunk_overlap_words >= self.summarizer.chunk_size_words
        {
            return Err(PipelineError::Config(
                "chunk_overlap_words must be smaller than a non-zero chunk_size_words".to_string(),
            ));
        }

        Ok(())
    }
}
