// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse PDF {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Embedding service error: {message}")]
    Embedding { message: String, transient: bool },

    #[error("Vector store error: {message}")]
    VectorStore { message: String, transient: bool },

    #[error("Summarization service error: {message}")]
    Summarization { message: String, transient: bool },

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PipelineError {
    pub fn embedding(message: impl Into<String>, transient: bool) -> Self {
        Self::Embedding {
            message: message.into(),
            transient,
        }
    }

    pub fn vector_store(message: impl Into<String>, transient: bool) -> Self {
        Self::VectorStore {
            message: message.into(),
            transient,
        }
    }

    pub fn summarization(message: impl Into<String>, transient: bool) -> Self {
        Self::Summarization {
            message: message.into(),
            transient,
        }
    }

    /// Whether a retry of the failed external call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Embedding { transient, .. }
            | Self::VectorStore { transient, .. }
            | Self::Summarization { transient, .. } => *transient,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(PipelineError::embedding("rate limited", true).is_transient());
        assert!(!PipelineError::vector_store("bad request", false).is_transient());
        assert!(!PipelineError::Config("missing token".to_string()).is_transient());
        assert!(
            !PipelineError::Parse {
                file: "a.pdf".to_string(),
                message: "not a pdf".to_string()
            }
            .is_transient()
        );
    }

    #[test]
    fn test_error_messages() {
        let err = PipelineError::Parse {
            file: "resume.pdf".to_string(),
            message: "invalid header".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to parse PDF resume.pdf: invalid header");

        let err = PipelineError::summarization("service unavailable", true);
        assert_eq!(
            err.to_string(),
            "Summarization service error: service unavailable"
        );
    }
}
