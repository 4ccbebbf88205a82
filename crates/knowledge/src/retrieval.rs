//! The query-time retrieval engine.
//!
//! One retrieval pass: embed the guest's message, rank the corpus by cosine
//! similarity, return the top chunks with a mean-similarity confidence.
//!
//! Retrieval never aborts a turn. An embedding or store failure degrades to
//! an empty result so the conversation continues without grounded context.

use innkeep_core::knowledge::{KnowledgeStore, RetrievalResult};
use innkeep_core::provider::EmbeddingRequest;
use innkeep_core::Provider;
use std::sync::Arc;
use tracing::{debug, warn};

/// Stateless retrieval over a knowledge store.
pub struct RetrievalEngine {
    embedder: Arc<dyn Provider>,
    store: Arc<dyn KnowledgeStore>,
    model: String,
    top_k: usize,
    threshold: f32,
}

impl RetrievalEngine {
    pub fn new(
        embedder: Arc<dyn Provider>,
        store: Arc<dyn KnowledgeStore>,
        model: impl Into<String>,
        top_k: usize,
        threshold: f32,
    ) -> Self {
        Self {
            embedder,
            store,
            model: model.into(),
            top_k,
            threshold,
        }
    }

    /// Retrieve context for one guest message.
    ///
    /// Degrades to `RetrievalResult::empty()` on any collaborator failure;
    /// the caller cannot distinguish "nothing relevant" from "embeddings
    /// down" and should not need to.
    pub async fn retrieve(&self, query: &str) -> RetrievalResult {
        let request = EmbeddingRequest {
            model: self.model.clone(),
            inputs: vec![query.to_string()],
        };

        let embedding = match self.embedder.embed(request).await {
            Ok(mut resp) if !resp.embeddings.is_empty() => resp.embeddings.remove(0),
            Ok(_) => {
                warn!("embedding service returned no vectors; retrieval degraded");
                return RetrievalResult::empty();
            }
            Err(e) => {
                warn!(error = %e, "embedding unavailable; retrieval degraded");
                return RetrievalResult::empty();
            }
        };

        match self.store.search(&embedding, self.threshold, self.top_k).await {
            Ok(chunks) => {
                let result = RetrievalResult::from_chunks(chunks);
                debug!(
                    chunks = result.chunks.len(),
                    confidence = result.confidence,
                    "retrieval complete"
                );
                result
            }
            Err(e) => {
                warn!(error = %e, "knowledge store unavailable; retrieval degraded");
                RetrievalResult::empty()
            }
        }
    }
}
