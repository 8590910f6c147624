// file: src/database/store.rs
// description: vector store abstraction shared by the Astra DB client and the in-memory store
// reference: internal module structure

use crate::error::Result;
use crate::models::{ResumeDocument, SearchResult};
use async_trait::async_trait;

/// Per-document result of [`VectorStore::add_documents`], in input order:
/// the stored id, or why that document could not be stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertOutcome {
    pub results: Vec<std::result::Result<String, String>>,
}

impl InsertOutcome {
    pub fn all_stored(ids: Vec<String>) -> Self {
        Self {
            results: ids.into_iter().map(Ok).collect(),
        }
    }

    pub fn stored_ids(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|r| r.as_ref().ok().cloned())
            .collect()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_err()).count()
    }
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Embeds and persists documents. Stored documents are searchable as soon
    /// as this returns. A document that cannot be stored is reported in the
    /// outcome and does not undo the ones already written.
    async fn add_documents(&self, documents: &[ResumeDocument]) -> Result<InsertOutcome>;

    /// Returns at most `k` documents nearest to `query`, highest score first.
    async fn similarity_search_with_score(&self, query: &str, k: usize)
    -> Result<Vec<SearchResult>>;

    async fn ping(&self) -> Result<bool>;

    async fn document_count(&self) -> Result<u64>;

    /// Creates the backing collection when missing. Stores without a schema
    /// have nothing to do.
    async fn ensure_collection(&self) -> Result<()> {
        Ok(())
    }
}

/// Cosine similarity rescaled to [0, 1] the way Astra DB reports `$similarity`.
pub fn similarity_score(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (1.0 + dot / (norm_a * norm_b)) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_outcome_counts() {
        let outcome = InsertOutcome {
            results: vec![
                Ok("id-1".to_string()),
                Err("rejected".to_string()),
                Ok("id-3".to_string()),
            ],
        };
        assert_eq!(outcome.stored_ids(), vec!["id-1", "id-3"]);
        assert_eq!(outcome.failed_count(), 1);
        assert_eq!(InsertOutcome::all_stored(vec!["a".to_string()]).failed_count(), 0);
    }

    #[test]
    fn test_similarity_score_range() {
        assert!((similarity_score(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!((similarity_score(&[1.0, 0.0], &[0.0, 1.0]) - 0.5).abs() < 1e-6);
        assert!(similarity_score(&[1.0, 0.0], &[-1.0, 0.0]).abs() < 1e-6);
    }

    #[test]
    fn test_similarity_score_degenerate() {
        assert_eq!(similarity_score(&[], &[]), 0.0);
        assert_eq!(similarity_score(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(similarity_score(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
