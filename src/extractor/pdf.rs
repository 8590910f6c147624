// file: src/extractor/pdf.rs
// description: PDF text extraction with NUL stripping, isolated per file
// reference: https://docs.rs/pdf-extract

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Turns uploaded bytes into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, name: String, bytes: Vec<u8>) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts the text of every page. Pages without a text layer contribute
    /// nothing; the result never contains NUL characters.
    pub fn extract(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let header_start = bytes
            .iter()
            .take(1024)
            .position(|&b| b == b'%')
            .filter(|&pos| bytes[pos..].starts_with(PDF_MAGIC));

        if header_start.is_none() {
            return Err(PipelineError::Parse {
                file: name.to_string(),
                message: "missing %PDF- header".to_string(),
            });
        }

        // pdf-extract panics on some malformed content streams.
        let extracted = catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(bytes)
        }))
        .map_err(|_| {
            warn!("PDF library panicked while reading {}", name);
            PipelineError::Parse {
                file: name.to_string(),
                message: "PDF content could not be decoded".to_string(),
            }
        })?
        .map_err(|e| PipelineError::Parse {
            file: name.to_string(),
            message: e.to_string(),
        })?;

        let text = strip_nul(&extracted);
        debug!("Extracted {} chars from {}", text.len(), name);
        Ok(text)
    }

    /// Runs [`extract`](Self::extract) on the blocking pool.
    pub async fn extract_async(&self, name: String, bytes: Vec<u8>) -> Result<String> {
        let extractor = *self;
        let file = name.clone();

        tokio::task::spawn_blocking(move || extractor.extract(&name, &bytes))
            .await
            .map_err(|e| PipelineError::Parse {
                file,
                message: format!("extraction task failed: {}", e),
            })?
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, name: String, bytes: Vec<u8>) -> Result<String> {
        self.extract_async(name, bytes).await
    }
}

pub fn strip_nul(text: &str) -> String {
    text.replace('\0', "")
}
