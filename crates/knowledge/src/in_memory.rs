//! In-memory knowledge store for tests and ingestion dry-runs.

use crate::vector;
use async_trait::async_trait;
use innkeep_core::error::StoreError;
use innkeep_core::knowledge::{KnowledgeChunk, KnowledgeStore, ScoredChunk};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Ephemeral knowledge store. Nothing survives a restart.
pub struct InMemoryKnowledgeStore {
    chunks: RwLock<Vec<KnowledgeChunk>>,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryKnowledgeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn insert(&self, mut chunk: KnowledgeChunk) -> Result<String, StoreError> {
        if chunk.id.is_empty() {
            chunk.id = Uuid::new_v4().to_string();
        }
        let id = chunk.id.clone();

        let mut chunks = self.chunks.write().await;
        if let Some(existing) = chunks.iter_mut().find(|c| c.id == chunk.id) {
            *existing = chunk;
        } else {
            chunks.push(chunk);
        }
        Ok(id)
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        threshold: f32,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        let chunks = self.chunks.read().await;
        vector::rank_chunks(&chunks, query_embedding, threshold, k)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.chunks.read().await.len())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.chunks.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_chunk(content: &str, embedding: Vec<f32>) -> KnowledgeChunk {
        KnowledgeChunk {
            id: String::new(),
            content: content.into(),
            source: "test".into(),
            embedding,
            metadata: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id() {
        let store = InMemoryKnowledgeStore::new();
        let id = store
            .insert(make_chunk("hello", vec![1.0, 0.0]))
            .await
            .unwrap();
        assert!(!id.is_empty());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_same_id_replaces() {
        let store = InMemoryKnowledgeStore::new();
        let mut c1 = make_chunk("v1", vec![1.0]);
        c1.id = "x".into();
        store.insert(c1).await.unwrap();

        let mut c2 = make_chunk("v2", vec![1.0]);
        c2.id = "x".into();
        store.insert(c2).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn search_applies_threshold_and_k() {
        let store = InMemoryKnowledgeStore::new();
        store
            .insert(make_chunk("a", vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .insert(make_chunk("b", vec![0.9, 0.1]))
            .await
            .unwrap();
        store
            .insert(make_chunk("c", vec![0.0, 1.0]))
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 0.3, 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "a");
    }

    #[tokio::test]
    async fn clear_empties_store() {
        let store = InMemoryKnowledgeStore::new();
        store
            .insert(make_chunk("a", vec![1.0]))
            .await
            .unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
