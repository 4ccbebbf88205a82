//! `innkeep ingest` — Chunk, embed, and store house documents.
//!
//! Walks a directory for `.txt` / `.md` files, splits each into
//! paragraph-based chunks, embeds the chunks, and stores them. Each run is
//! a full re-ingestion: the store is cleared first, so documents that
//! shrank or disappeared leave no stale chunks behind.

use super::{build_embedder, load_config};
use anyhow::{bail, Context};
use innkeep_core::knowledge::{KnowledgeChunk, KnowledgeStore};
use innkeep_core::provider::EmbeddingRequest;
use innkeep_core::Provider;
use innkeep_knowledge::{chunker, SqliteKnowledgeStore};
use std::path::{Path, PathBuf};
use tracing::info;

pub async fn run(config_path: &Path, dir: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let Some(embedder) = build_embedder(&config)? else {
        bail!("ingestion requires an embedding API key (set OPENAI_API_KEY)");
    };

    let store = SqliteKnowledgeStore::new(&config.storage.knowledge_path).await?;

    let (total_chunks, total_files) =
        ingest_directory(embedder.as_ref(), &store, &config.embeddings.model, dir).await?;

    let count = store.count().await?;
    println!(
        "Ingested {} chunk(s) from {} file(s); knowledge store now holds {} chunk(s).",
        total_chunks, total_files, count
    );

    Ok(())
}

/// Full re-ingestion of `dir` into `store`. Clears the store before any
/// insert, then writes every chunk of every document found. Returns the
/// chunk and file counts.
async fn ingest_directory(
    embedder: &dyn Provider,
    store: &dyn KnowledgeStore,
    model: &str,
    dir: &Path,
) -> anyhow::Result<(usize, usize)> {
    let files = collect_documents(dir)?;
    if files.is_empty() {
        bail!("no .txt or .md files found under {}", dir.display());
    }

    store.clear().await?;

    let mut total_chunks = 0usize;
    for file in &files {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let source = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());

        let chunks = chunker::chunk_text(&text);
        if chunks.is_empty() {
            info!(file = %source, "no usable paragraphs, skipped");
            continue;
        }

        let response = embedder
            .embed(EmbeddingRequest {
                model: model.to_string(),
                inputs: chunks.clone(),
            })
            .await?;
        if response.embeddings.len() != chunks.len() {
            bail!(
                "embedding service returned {} vectors for {} chunks of {}",
                response.embeddings.len(),
                chunks.len(),
                source
            );
        }

        for (index, (content, embedding)) in
            chunks.into_iter().zip(response.embeddings).enumerate()
        {
            let mut metadata = serde_json::Map::new();
            metadata.insert("chunk_index".into(), index.into());
            store
                .insert(KnowledgeChunk {
                    id: format!("{source}#{index}"),
                    content,
                    source: source.clone(),
                    embedding,
                    metadata,
                })
                .await?;
            total_chunks += 1;
        }

        info!(file = %source, "ingested");
    }

    Ok((total_chunks, files.len()))
}

/// All `.txt` / `.md` files under `dir`, recursively, in stable order.
fn collect_documents(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current)
            .with_context(|| format!("failed to read directory {}", current.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("txt") | Some("md")
            ) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use innkeep_core::error::{EmbeddingError, ProviderError};
    use innkeep_core::provider::{EmbeddingResponse, ProviderRequest, ProviderResponse};
    use innkeep_knowledge::InMemoryKnowledgeStore;

    struct FakeEmbedder;

    #[async_trait]
    impl Provider for FakeEmbedder {
        fn name(&self) -> &str {
            "fake"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("embed-only".into()))
        }

        async fn embed(
            &self,
            request: EmbeddingRequest,
        ) -> std::result::Result<EmbeddingResponse, EmbeddingError> {
            Ok(EmbeddingResponse {
                embeddings: request.inputs.iter().map(|_| vec![1.0, 0.0]).collect(),
                model: request.model,
            })
        }
    }

    #[tokio::test]
    async fn reingestion_drops_stale_chunks() {
        let dir = tempfile::tempdir().unwrap();
        // two paragraphs too large to pack into one chunk
        let para_a = "Check-in instructions for arriving guests. ".repeat(14);
        let para_b = "Laundry instructions for the machine downstairs. ".repeat(14);
        std::fs::write(dir.path().join("guide.txt"), format!("{para_a}\n\n{para_b}")).unwrap();
        std::fs::write(dir.path().join("extra.md"), "Notes about visitor parking.").unwrap();

        let store = InMemoryKnowledgeStore::new();
        ingest_directory(&FakeEmbedder, &store, "fake-model", dir.path())
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 3);

        // one document shrinks, the other disappears
        std::fs::write(dir.path().join("guide.txt"), para_a).unwrap();
        std::fs::remove_file(dir.path().join("extra.md")).unwrap();

        let (chunks, files) = ingest_directory(&FakeEmbedder, &store, "fake-model", dir.path())
            .await
            .unwrap();
        assert_eq!((chunks, files), (1, 1));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_directory_is_an_error_and_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryKnowledgeStore::new();
        store
            .insert(KnowledgeChunk {
                id: "seed#0".into(),
                content: "seeded".into(),
                source: "seed".into(),
                embedding: vec![1.0, 0.0],
                metadata: serde_json::Map::new(),
            })
            .await
            .unwrap();

        let err = ingest_directory(&FakeEmbedder, &store, "fake-model", dir.path()).await;
        assert!(err.is_err());
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
