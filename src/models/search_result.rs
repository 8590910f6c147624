// file: src/models/search_result.rs
// description: similarity search results and the filtered search outcome
// reference: vector search result handling

use crate::models::document::ResumeDocument;
use serde::{Deserialize, Serialize};

/// A document returned by a similarity search with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub document: ResumeDocument,
    /// Higher is more similar.
    pub score: f32,
}

impl SearchResult {
    pub fn new(id: String, document: ResumeDocument, score: f32) -> Self {
        Self {
            id,
            document,
            score,
        }
    }
}

/// Result of a search after the relevance threshold is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Matches(Vec<SearchResult>),
    NoMatches {
        threshold: f32,
        candidates_considered: usize,
    },
}

impl SearchOutcome {
    /// Keeps the results scoring strictly above `threshold`.
    pub fn from_candidates(candidates: Vec<SearchResult>, threshold: f32) -> Self {
        let considered = candidates.len();
        let matches = candidates
            .into_iter()
            .filter(|r| r.score > threshold)
            .collect::<Vec<_>>();

        if matches.is_empty() {
            SearchOutcome::NoMatches {
                threshold,
                candidates_considered: considered,
            }
        } else {
            SearchOutcome::Matches(matches)
        }
    }

    pub fn matches(&self) -> &[SearchResult] {
        match self {
            SearchOutcome::Matches(results) => results,
            SearchOutcome::NoMatches { .. } => &[],
        }
    }
}
