//! In-memory session store for tests.

use async_trait::async_trait;
use chrono::Utc;
use innkeep_core::error::StoreError;
use innkeep_core::message::Role;
use innkeep_core::session::{Apartment, ChatMessage, ChatSession, SessionStore};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, ChatSession>,
    messages: Vec<ChatMessage>,
}

/// Ephemeral session store. Nothing survives a restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    inner: RwLock<Inner>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn create_session(&self, locale: &str) -> Result<ChatSession, StoreError> {
        let session = ChatSession {
            id: Uuid::new_v4().to_string(),
            locale: locale.to_string(),
            apartment: None,
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .sessions
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn get_session(&self, id: &str) -> Result<Option<ChatSession>, StoreError> {
        Ok(self.inner.read().await.sessions.get(id).cloned())
    }

    async fn record_apartment(&self, id: &str, apartment: Apartment) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("session {id}")))?;

        if session.apartment.is_some() {
            return Ok(false);
        }
        session.apartment = Some(apartment);
        Ok(true)
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
        self.inner.write().await.messages.push(message.clone());
        Ok(message)
    }

    async fn messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect())
    }
}
