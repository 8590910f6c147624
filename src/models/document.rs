// file: src/models/document.rs
// description: resume document model assembled from extracted text and upload context
// reference: internal data structures

use crate::extractor::ResumeHeuristics;
use crate::extractor::patterns::{NOT_AVAILABLE, NOT_MENTIONED};
use crate::models::session::SessionId;
use serde::{Deserialize, Serialize};

/// Flat metadata stored next to each resume in the vector store.
///
/// Missing keys fall back to the heuristic placeholders so records written
/// by older uploaders (which used `unique_id`) still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeMetadata {
    pub name: String,
    pub size: u64,
    #[serde(alias = "unique_id")]
    pub session_id: String,
    pub years_of_experience: String,
    pub key_skills: String,
    pub description: String,
}

impl Default for ResumeMetadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            size: 0,
            session_id: String::new(),
            years_of_experience: NOT_MENTIONED.to_string(),
            key_skills: NOT_MENTIONED.to_string(),
            description: NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub text: String,
    pub metadata: ResumeMetadata,
}

impl ResumeDocument {
    /// Combines extracted text, heuristic fields and upload context.
    pub fn assemble(
        text: String,
        heuristics: ResumeHeuristics,
        name: String,
        size: u64,
        session_id: &SessionId,
    ) -> Self {
        Self {
            text,
            metadata: ResumeMetadata {
                name,
                size,
                session_id: session_id.to_string(),
                years_of_experience: heuristics.years_of_experience,
                key_skills: heuristics.key_skills,
                description: heuristics.description,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
