//! Vector similarity utilities.
//!
//! Pure-Rust cosine similarity and in-process ranking over corpus chunks.
//! Both SQLite and in-memory backends rank through the same code path.

use innkeep_core::error::EmbeddingError;
use innkeep_core::knowledge::{KnowledgeChunk, ScoredChunk};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank chunks by cosine similarity to a query embedding.
///
/// Returns the `k` best chunks with similarity strictly above `threshold`,
/// sorted best first. Fails with `DimensionMismatch` when any stored chunk's
/// embedding has a different length than the query; a mixed-dimension corpus
/// means the ingestion model and the query model diverged.
pub fn rank_chunks(
    chunks: &[KnowledgeChunk],
    query_embedding: &[f32],
    threshold: f32,
    k: usize,
) -> Result<Vec<ScoredChunk>, EmbeddingError> {
    let mut scored: Vec<ScoredChunk> = Vec::new();

    for chunk in chunks {
        if chunk.embedding.len() != query_embedding.len() {
            return Err(EmbeddingError::DimensionMismatch {
                store: chunk.embedding.len(),
                query: query_embedding.len(),
            });
        }
        let sim = cosine_similarity(&chunk.embedding, query_embedding);
        if sim > threshold {
            scored.push(ScoredChunk {
                content: chunk.content.clone(),
                source: chunk.source.clone(),
                similarity: sim,
            });
        }
    }

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(k);
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, embedding: Vec<f32>) -> KnowledgeChunk {
        KnowledgeChunk {
            id: id.into(),
            content: format!("Content for {id}"),
            source: "test".into(),
            embedding,
            metadata: serde_json::Map::new(),
        }
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn cosine_opposite_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!((sim - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn cosine_empty_vectors() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn cosine_mismatched_lengths() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_zero_vector() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_known_value() {
        // [1,1] · [1,0] = 1, |[1,1]| = sqrt(2), |[1,0]| = 1
        // similarity = 1 / sqrt(2) ≈ 0.7071
        let a = vec![1.0, 1.0];
        let b = vec![1.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!((sim - 0.7071).abs() < 0.001);
    }

    #[test]
    fn rank_orders_by_similarity() {
        let query = vec![1.0, 0.0, 0.0];
        let chunks = vec![
            chunk("a", vec![0.0, 1.0, 0.0]), // orthogonal = 0
            chunk("b", vec![1.0, 0.0, 0.0]), // identical = 1
            chunk("c", vec![0.5, 0.5, 0.0]), // partial = ~0.707
        ];

        let results = rank_chunks(&chunks, &query, -1.0, 10).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].content.contains("b"));
        assert!(results[1].content.contains("c"));
        assert!(results[2].content.contains("a"));
    }

    #[test]
    fn rank_threshold_is_strict() {
        let query = vec![1.0, 0.0];
        let chunks = vec![
            chunk("a", vec![1.0, 0.0]), // sim = 1.0
            chunk("b", vec![0.0, 1.0]), // sim = 0.0
        ];

        let results = rank_chunks(&chunks, &query, 0.0, 10).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].content.contains("a"));
    }

    #[test]
    fn rank_respects_k() {
        let query = vec![1.0, 0.0];
        let chunks: Vec<_> = (0..10)
            .map(|i| chunk(&format!("c{i}"), vec![1.0, i as f32 * 0.1]))
            .collect();

        let results = rank_chunks(&chunks, &query, 0.0, 3).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn rank_rejects_mixed_dimensions() {
        let query = vec![1.0, 0.0];
        let chunks = vec![chunk("a", vec![1.0, 0.0, 0.0])];
        let err = rank_chunks(&chunks, &query, 0.0, 10).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch { store: 3, query: 2 }
        ));
    }
}
