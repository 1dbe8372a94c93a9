//! In-process vector index backed by an append-only record list.
//!
//! Concurrent upserts never conflict (append-only, no in-place update) and
//! queries observe an eventually-consistent snapshot, which is acceptable for
//! an enrichment signal.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::core::errors::AssistantResult;
use crate::core::ids::MemoryId;
use crate::embedding::embedder::Embedder;
use crate::memory::index::{IndexFuture, MemoryIndex, MemoryRecord};

/// Vector memory index holding records in process memory.
pub struct InMemoryVectorIndex {
    name: String,
    embedder: Arc<dyn Embedder>,
    records: RwLock<Vec<MemoryRecord>>,
}

impl InMemoryVectorIndex {
    /// Create an empty index that embeds through `embedder`.
    ///
    /// `name` only labels log lines (e.g. "personal", "collective").
    #[must_use]
    pub fn new(name: impl Into<String>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            name: name.into(),
            embedder,
            records: RwLock::new(Vec::new()),
        }
    }
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a <= f64::EPSILON || norm_b <= f64::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl MemoryIndex for InMemoryVectorIndex {
    fn query(&self, text: &str, top_k: usize) -> IndexFuture<'_, AssistantResult<Vec<String>>> {
        let text = text.to_string();
        Box::pin(async move {
            if top_k == 0 {
                return Ok(Vec::new());
            }

            let query_vec = self.embedder.embed_text(&text).await?;
            let records = self.records.read().await;
            let mut scored: Vec<(f64, &MemoryRecord)> = records
                .iter()
                .map(|record| (cosine_similarity(&query_vec, &record.embedding), record))
                .collect();
            scored.sort_by(|(score_a, record_a), (score_b, record_b)| {
                score_b
                    .partial_cmp(score_a)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| record_b.created_at.cmp(&record_a.created_at))
            });

            Ok(scored
                .into_iter()
                .take(top_k)
                .map(|(_, record)| record.content.clone())
                .collect())
        })
    }

    fn upsert(&self, content: &str) -> IndexFuture<'_, AssistantResult<()>> {
        let content = content.to_string();
        Box::pin(async move {
            let embedding = self.embedder.embed_text(&content).await?;
            let record = MemoryRecord {
                id: MemoryId::new(),
                content,
                created_at: Utc::now(),
                embedding,
            };

            let mut records = self.records.write().await;
            records.push(record);
            debug!(
                "Stored memory record in {} index ({} total)",
                self.name,
                records.len()
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::{FailingEmbedder, KeywordEmbedder};

    fn index() -> InMemoryVectorIndex {
        InMemoryVectorIndex::new("test", Arc::new(KeywordEmbedder))
    }

    #[tokio::test]
    async fn empty_index_returns_empty() {
        let index = index();
        let results = index.query("cats", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn most_similar_records_rank_first() {
        let index = index();
        index.upsert("dogs bark loudly").await.unwrap();
        index.upsert("cats purr softly").await.unwrap();

        let results = index.query("cats", 1).await.unwrap();
        assert_eq!(results, vec!["cats purr softly".to_string()]);
    }

    #[tokio::test]
    async fn similarity_ties_break_by_recency() {
        let index = index();
        index.upsert("cats first").await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        index.upsert("cats second").await.unwrap();

        let results = index.query("cats", 2).await.unwrap();
        assert_eq!(
            results,
            vec!["cats second".to_string(), "cats first".to_string()]
        );
    }

    #[tokio::test]
    async fn top_k_bounds_the_result_set() {
        let index = index();
        for i in 0..4 {
            index.upsert(&format!("cats entry {i}")).await.unwrap();
        }

        let results = index.query("cats", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(index.query("cats", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn embedder_failure_surfaces_to_caller() {
        let index = InMemoryVectorIndex::new("test", Arc::new(FailingEmbedder));
        assert!(index.query("cats", 3).await.is_err());
        assert!(index.upsert("cats").await.is_err());
    }

    #[test]
    fn cosine_similarity_handles_zero_vectors() {
        assert!((cosine_similarity(&[0.0, 0.0], &[1.0, 0.0])).abs() < f64::EPSILON);
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
    }
}
