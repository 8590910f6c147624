// file: src/models/upload.rs
// description: uploaded file input and per-batch upload report
// reference: internal data structures

use crate::error::{PipelineError, Result};
use crate::models::session::SessionId;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| PipelineError::FileOperation {
                path: path.to_path_buf(),
                source,
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A file that could not be turned into a resume document.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub session_id: SessionId,
    pub document_ids: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl UploadReport {
    pub fn uploaded(&self) -> usize {
        self.document_ids.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
