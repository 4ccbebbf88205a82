//! Knowledge corpus types and the KnowledgeStore trait.
//!
//! The corpus is a set of content chunks with embeddings, populated offline
//! by the ingestion process. Chunks are immutable once ingested; the
//! retrieval engine is a pure function over this store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A bounded span of source text with an attached embedding — the unit of
/// retrieval. Immutable once ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Unique ID (assigned by the store when empty)
    #[serde(default)]
    pub id: String,

    /// The chunk text
    pub content: String,

    /// Origin label (document name, "apartments/unit3", ...)
    pub source: String,

    /// Fixed-length embedding vector. Dimensionality is constant across the
    /// store and must match the embedding service used at query time.
    #[serde(skip)]
    pub embedding: Vec<f32>,

    /// Open key/value metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// A chunk returned from similarity search, with its score attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub content: String,
    pub source: String,
    /// Cosine similarity in [0, 1]
    pub similarity: f32,
}

/// The transient result of one retrieval pass. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Ranked chunks, best first
    pub chunks: Vec<ScoredChunk>,

    /// Mean similarity across returned chunks; 0 when none were found
    pub confidence: f32,
}

impl RetrievalResult {
    /// Build a result from ranked chunks, computing the mean-similarity
    /// confidence. An empty chunk list yields zero confidence.
    pub fn from_chunks(chunks: Vec<ScoredChunk>) -> Self {
        let confidence = if chunks.is_empty() {
            0.0
        } else {
            chunks.iter().map(|c| c.similarity).sum::<f32>() / chunks.len() as f32
        };
        Self { chunks, confidence }
    }

    /// An empty result: no chunks, zero confidence. Used when the embedding
    /// service is unavailable and the turn proceeds without context.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Vector similarity search over the knowledge corpus.
///
/// Implementations: SQLite (production), in-memory (tests and ingestion
/// dry-runs). The store owns no query-time state; ranking is cosine
/// similarity against the stored embeddings.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// The backend name (e.g. "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Insert a chunk, returning its ID.
    async fn insert(&self, chunk: KnowledgeChunk) -> Result<String, StoreError>;

    /// The `k` chunks most similar to `query_embedding` with similarity
    /// strictly above `threshold`, best first.
    async fn search(
        &self,
        query_embedding: &[f32],
        threshold: f32,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, StoreError>;

    /// Total chunk count.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Remove every chunk (used by full re-ingestion).
    async fn clear(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(sim: f32) -> ScoredChunk {
        ScoredChunk {
            content: "c".into(),
            source: "s".into(),
            similarity: sim,
        }
    }

    #[test]
    fn confidence_is_mean_of_similarities() {
        let result = RetrievalResult::from_chunks(vec![scored(0.4), scored(0.6), scored(0.8)]);
        assert!((result.confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn empty_result_has_zero_confidence() {
        let result = RetrievalResult::from_chunks(vec![]);
        assert_eq!(result.confidence, 0.0);
        assert!(result.chunks.is_empty());
        assert_eq!(RetrievalResult::empty().confidence, 0.0);
    }

    #[test]
    fn single_chunk_confidence_equals_its_similarity() {
        let result = RetrievalResult::from_chunks(vec![scored(0.73)]);
        assert!((result.confidence - 0.73).abs() < 1e-6);
    }
}
