//! SQLite corpus backend.
//!
//! A single `chunks` table holds the ingested corpus; embeddings are stored
//! as little-endian f32 BLOBs. Ranking happens in-process: the corpus for a
//! five-unit property is small enough that a full scan per query is cheap.

use crate::vector;
use async_trait::async_trait;
use innkeep_core::error::StoreError;
use innkeep_core::knowledge::{KnowledgeChunk, KnowledgeStore, ScoredChunk};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// Durable knowledge store backed by SQLite.
pub struct SqliteKnowledgeStore {
    pool: SqlitePool,
}

impl SqliteKnowledgeStore {
    /// Open (or create) the corpus database at `path`.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite knowledge store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                iid        INTEGER PRIMARY KEY AUTOINCREMENT,
                id         TEXT UNIQUE NOT NULL,
                content    TEXT NOT NULL,
                source     TEXT NOT NULL,
                metadata   TEXT NOT NULL DEFAULT '{}',
                embedding  BLOB NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("chunks table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source)")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("source index: {e}")))?;

        debug!("SQLite knowledge migrations complete");
        Ok(())
    }

    /// Serialize an embedding vector to bytes.
    fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize an embedding vector from bytes.
    fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
        blob.chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn row_to_chunk(row: &sqlx::sqlite::SqliteRow) -> Result<KnowledgeChunk, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| StoreError::QueryFailed(format!("content column: {e}")))?;
        let source: String = row
            .try_get("source")
            .map_err(|e| StoreError::QueryFailed(format!("source column: {e}")))?;
        let metadata_json: String = row
            .try_get("metadata")
            .map_err(|e| StoreError::QueryFailed(format!("metadata column: {e}")))?;
        let blob: Vec<u8> = row
            .try_get("embedding")
            .map_err(|e| StoreError::QueryFailed(format!("embedding column: {e}")))?;

        let metadata = serde_json::from_str(&metadata_json).unwrap_or_default();

        Ok(KnowledgeChunk {
            id,
            content,
            source,
            embedding: Self::blob_to_embedding(&blob),
            metadata,
        })
    }
}

#[async_trait]
impl KnowledgeStore for SqliteKnowledgeStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn insert(&self, mut chunk: KnowledgeChunk) -> Result<String, StoreError> {
        if chunk.id.is_empty() {
            chunk.id = Uuid::new_v4().to_string();
        }
        let id = chunk.id.clone();
        let metadata_json = serde_json::to_string(&chunk.metadata)
            .map_err(|e| StoreError::Storage(format!("Metadata serialization: {e}")))?;
        let blob = Self::embedding_to_blob(&chunk.embedding);
        let created_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO chunks (id, content, source, metadata, embedding, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                content = excluded.content,
                source = excluded.source,
                metadata = excluded.metadata,
                embedding = excluded.embedding
            "#,
        )
        .bind(&chunk.id)
        .bind(&chunk.content)
        .bind(&chunk.source)
        .bind(&metadata_json)
        .bind(&blob)
        .bind(&created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT failed: {e}")))?;

        debug!("Stored chunk {id}");
        Ok(id)
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        threshold: f32,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        let rows = sqlx::query("SELECT * FROM chunks")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("Corpus scan: {e}")))?;

        let chunks: Vec<KnowledgeChunk> = rows
            .iter()
            .map(Self::row_to_chunk)
            .collect::<Result<_, _>>()?;

        vector::rank_chunks(&chunks, query_embedding, threshold, k)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM chunks")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("CLEAR failed: {e}")))?;

        Ok(())
    }
}
