// file: src/summarizer/mod.rs
// description: map-reduce summarization of a single resume document
// reference: https://docs.rs/futures/latest/futures/stream/trait.StreamExt.html#method.buffered

pub mod chunker;
pub mod completion;
pub mod prompts;

pub use completion::{CompletionProvider, OpenAiCompletionClient};

use crate::config::{PipelineConfig, SummarizerConfig};
use crate::error::{PipelineError, Result};
use crate::models::ResumeDocument;
use chunker::{chunk_words, word_count};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct Summarizer {
    provider: Arc<dyn CompletionProvider>,
    chunk_size: usize,
    chunk_overlap: usize,
    max_collapse_depth: usize,
    parallel_requests: usize,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &SummarizerConfig) -> Self {
        Self {
            provider,
            chunk_size: config.chunk_size_words.max(1),
            chunk_overlap: config.chunk_overlap_words,
            max_collapse_depth: config.max_collapse_depth,
            parallel_requests: config.parallel_requests.max(1),
        }
    }

    pub fn from_config(config: &SummarizerConfig, pipeline: &PipelineConfig) -> Result<Self> {
        let client = OpenAiCompletionClient::new(config.clone(), pipeline)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Summarizes one resume. Failures are tagged with the document name so
    /// callers can report them per result.
    pub async fn summarize(&self, document: &ResumeDocument) -> Result<String> {
        self.summarize_text(&document.text)
            .await
            .map_err(|e| match e {
                PipelineError::Summarization { message, transient } => {
                    PipelineError::summarization(
                        format!("{}: {}", document.name(), message),
                        transient,
                    )
                }
                other => other,
            })
    }

    pub async fn summarize_text(&self, text: &str) -> Result<String> {
        let chunks = chunk_words(text, self.chunk_size, self.chunk_overlap);
        if chunks.is_empty() {
            return Ok(prompts::EMPTY_DOCUMENT_SUMMARY.to_string());
        }

        info!("Summarizing {} chunk(s)", chunks.len());
        let mut summaries = self.map(chunks, prompts::map_prompt).await?;
        if summaries.len() == 1 {
            return Ok(summaries.remove(0));
        }

        // Collapse until the combined summaries fit in one chunk.
        let mut depth = 0;
        while depth < self.max_collapse_depth
            && word_count(&summaries.join("\n\n")) > self.chunk_size
        {
            depth += 1;
            let groups = chunk_words(&summaries.join("\n\n"), self.chunk_size, self.chunk_overlap);
            debug!("Collapse pass {} over {} group(s)", depth, groups.len());
            summaries = self
                .map(groups, |group| prompts::combine_prompt(&[group.to_string()]))
                .await?;
        }

        self.provider
            .complete(&prompts::combine_prompt(&summaries))
            .await
    }

    /// Runs one completion per input with bounded concurrency, keeping input order.
    async fn map<F>(&self, inputs: Vec<String>, build_prompt: F) -> Result<Vec<String>>
    where
        F: Fn(&str) -> String,
    {
        let prompts = inputs.iter().map(|input| build_prompt(input)).collect::<Vec<_>>();
        let provider = &self.provider;

        stream::iter(prompts)
            .map(|prompt| async move { provider.complete(&prompt).await })
            .buffered(self.parallel_requests)
            .try_collect()
            .await
    }
}
