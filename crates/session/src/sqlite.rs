//! SQLite session backend.
//!
//! Two tables: `chat_sessions` (one row per conversation) and
//! `chat_messages` (append-only transcript). The sticky apartment assignment
//! is enforced in SQL with a conditional UPDATE, so it holds even with
//! concurrent turns on the same session.

use async_trait::async_trait;
use chrono::Utc;
use innkeep_core::error::StoreError;
use innkeep_core::message::Role;
use innkeep_core::session::{Apartment, ChatMessage, ChatSession, SessionStore};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// Durable session store backed by SQLite.
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Open (or create) the session database at `path`.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite session store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_sessions (
                id         TEXT PRIMARY KEY,
                locale     TEXT NOT NULL,
                apartment  TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("chat_sessions table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_messages (
                iid        INTEGER PRIMARY KEY AUTOINCREMENT,
                id         TEXT UNIQUE NOT NULL,
                session_id TEXT NOT NULL REFERENCES chat_sessions(id),
                role       TEXT NOT NULL,
                content    TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("chat_messages table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_session ON chat_messages(session_id, iid)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("session index: {e}")))?;

        debug!("SQLite session migrations complete");
        Ok(())
    }

    fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<ChatSession, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let locale: String = row
            .try_get("locale")
            .map_err(|e| StoreError::QueryFailed(format!("locale column: {e}")))?;
        let apartment_str: Option<String> = row
            .try_get("apartment")
            .map_err(|e| StoreError::QueryFailed(format!("apartment column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;

        let apartment = apartment_str.as_deref().and_then(Apartment::parse);
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(ChatSession {
            id,
            locale,
            apartment,
            created_at,
        })
    }

    fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<ChatMessage, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let session_id: String = row
            .try_get("session_id")
            .map_err(|e| StoreError::QueryFailed(format!("session_id column: {e}")))?;
        let role_str: String = row
            .try_get("role")
            .map_err(|e| StoreError::QueryFailed(format!("role column: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| StoreError::QueryFailed(format!("content column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;

        let role = Role::parse(&role_str)
            .ok_or_else(|| StoreError::QueryFailed(format!("unknown role: {role_str}")))?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(ChatMessage {
            id,
            session_id,
            role,
            content,
            created_at,
        })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn create_session(&self, locale: &str) -> Result<ChatSession, StoreError> {
        let session = ChatSession {
            id: Uuid::new_v4().to_string(),
            locale: locale.to_string(),
            apartment: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO chat_sessions (id, locale, apartment, created_at) VALUES (?1, ?2, NULL, ?3)",
        )
        .bind(&session.id)
        .bind(&session.locale)
        .bind(session.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT session failed: {e}")))?;

        debug!(session_id = %session.id, "created session");
        Ok(session)
    }

    async fn get_session(&self, id: &str) -> Result<Option<ChatSession>, StoreError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("GET session: {e}")))?;

        match row {
            Some(ref r) => Ok(Some(Self::row_to_session(r)?)),
            None => Ok(None),
        }
    }

    async fn record_apartment(&self, id: &str, apartment: Apartment) -> Result<bool, StoreError> {
        // First-write-wins lives in the WHERE clause; a second writer's
        // UPDATE matches zero rows.
        let result =
            sqlx::query("UPDATE chat_sessions SET apartment = ?2 WHERE id = ?1 AND apartment IS NULL")
                .bind(id)
                .bind(apartment.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Storage(format!("UPDATE apartment failed: {e}")))?;

        if result.rows_affected() > 0 {
            debug!(session_id = %id, apartment = %apartment, "recorded apartment");
            return Ok(true);
        }

        // Zero rows means either already assigned or no such session.
        match self.get_session(id).await? {
            Some(_) => Ok(false),
            None => Err(StoreError::NotFound(format!("session {id}"))),
        }
    }

    async fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ChatMessage, StoreError> {
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO chat_messages (id, session_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&message.id)
        .bind(&message.session_id)
        .bind(role.as_str())
        .bind(&message.content)
        .bind(message.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT message failed: {e}")))?;

        Ok(message)
    }

    async fn messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let rows = sqlx::query("SELECT * FROM chat_messages WHERE session_id = ?1 ORDER BY iid")
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("GET messages: {e}")))?;

        rows.iter().map(Self::row_to_message).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteSessionStore {
        SqliteSessionStore::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn create_and_get_session() {
        let store = test_store().await;
        let session = store.create_session("de").await.unwrap();
        assert!(session.apartment.is_none());

        let fetched = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.locale, "de");
        assert!(fetched.apartment.is_none());
    }

    #[tokio::test]
    async fn get_unknown_session_is_none() {
        let store = test_store().await;
        assert!(store.get_session("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn first_apartment_write_wins() {
        let store = test_store().await;
        let session = store.create_session("en").await.unwrap();

        let first = store
            .record_apartment(&session.id, Apartment::Unit3)
            .await
            .unwrap();
        assert!(first);

        let second = store
            .record_apartment(&session.id, Apartment::Unit5)
            .await
            .unwrap();
        assert!(!second);

        let fetched = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(fetched.apartment, Some(Apartment::Unit3));
    }

    #[tokio::test]
    async fn record_apartment_unknown_session() {
        let store = test_store().await;
        let err = store
            .record_apartment("missing", Apartment::Unit1)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn same_apartment_twice_second_is_noop() {
        let store = test_store().await;
        let session = store.create_session("fr").await.unwrap();
        assert!(store
            .record_apartment(&session.id, Apartment::Unit2)
            .await
            .unwrap());
        assert!(!store
            .record_apartment(&session.id, Apartment::Unit2)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn messages_keep_creation_order() {
        let store = test_store().await;
        let session = store.create_session("en").await.unwrap();

        store
            .append_message(&session.id, Role::User, "Hi there")
            .await
            .unwrap();
        store
            .append_message(&session.id, Role::Assistant, "Welcome!")
            .await
            .unwrap();
        store
            .append_message(&session.id, Role::User, "Where do I park?")
            .await
            .unwrap();

        let messages = store.messages(&session.id).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "Hi there");
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[2].content, "Where do I park?");
    }

    #[tokio::test]
    async fn messages_are_scoped_to_session() {
        let store = test_store().await;
        let a = store.create_session("en").await.unwrap();
        let b = store.create_session("en").await.unwrap();

        store
            .append_message(&a.id, Role::User, "for session a")
            .await
            .unwrap();
        store
            .append_message(&b.id, Role::User, "for session b")
            .await
            .unwrap();

        let a_messages = store.messages(&a.id).await.unwrap();
        assert_eq!(a_messages.len(), 1);
        assert_eq!(a_messages[0].content, "for session a");
    }

    #[tokio::test]
    async fn concurrent_sessions_are_distinct() {
        let store = test_store().await;
        let a = store.create_session("en").await.unwrap();
        let b = store.create_session("en").await.unwrap();
        assert_ne!(a.id, b.id);
    }
}
