// file: src/exporter/json.rs
// description: json export of search results with optional summaries
// reference: https://docs.rs/serde_json

use crate::error::{PipelineError, Result};
use crate::models::SearchResult;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct SearchReportExporter {
    output_path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ExportedMatch {
    pub rank: usize,
    pub id: String,
    pub score: f32,
    pub name: String,
    pub size: u64,
    pub session_id: String,
    pub years_of_experience: String,
    pub key_skills: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchReport {
    pub exported_at: String,
    pub query: String,
    pub threshold: f32,
    pub matches: Vec<ExportedMatch>,
}

impl SearchReport {
    /// `summaries` is keyed by the 1-based rank of the match.
    pub fn new(
        query: &str,
        threshold: f32,
        matches: &[SearchResult],
        summaries: &HashMap<usize, String>,
    ) -> Self {
        let matches = matches
            .iter()
            .enumerate()
            .map(|(index, result)| {
                let rank = index + 1;
                let metadata = &result.document.metadata;
                ExportedMatch {
                    rank,
                    id: result.id.clone(),
                    score: result.score,
                    name: metadata.name.clone(),
                    size: metadata.size,
                    session_id: metadata.session_id.clone(),
                    years_of_experience: metadata.years_of_experience.clone(),
                    key_skills: metadata.key_skills.clone(),
                    description: metadata.description.clone(),
                    summary: summaries.get(&rank).cloned(),
                }
            })
            .collect();

        Self {
            exported_at: Utc::now().to_rfc3339(),
            query: query.to_string(),
            threshold,
            matches,
        }
    }
}

impl SearchReportExporter {
    pub fn new(output_path: impl Into<PathBuf>) -> Result<Self> {
        let output_path = output_path.into();
        if let Some(parent) = output_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| PipelineError::FileOperation {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(Self { output_path })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn export(&self, report: &SearchReport, pretty: bool) -> Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };

        fs::write(&self.output_path, json).map_err(|source| PipelineError::FileOperation {
            path: self.output_path.clone(),
            source,
        })?;

        info!(
            "Exported {} matches to {}",
            report.matches.len(),
            self.output_path.display()
        );
        Ok(())
    }
}
