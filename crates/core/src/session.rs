//! Session domain types and the SessionStore trait.
//!
//! One `ChatSession` per conversation, with an append-only `ChatMessage`
//! log. The apartment field is *sticky*: assigned at most once, first
//! detection wins, never overwritten for the life of the session.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::message::Role;

/// One of the fixed set of guest units.
///
/// Units 1–4 share a building (and a Wi-Fi password); Unit 5 is a separate
/// building with its own credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Apartment {
    Unit1,
    Unit2,
    Unit3,
    Unit4,
    Unit5,
}

impl Apartment {
    pub const ALL: [Apartment; 5] = [
        Apartment::Unit1,
        Apartment::Unit2,
        Apartment::Unit3,
        Apartment::Unit4,
        Apartment::Unit5,
    ];

    /// Wire/storage form, e.g. `"UNIT3"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Apartment::Unit1 => "UNIT1",
            Apartment::Unit2 => "UNIT2",
            Apartment::Unit3 => "UNIT3",
            Apartment::Unit4 => "UNIT4",
            Apartment::Unit5 => "UNIT5",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "UNIT1" => Some(Apartment::Unit1),
            "UNIT2" => Some(Apartment::Unit2),
            "UNIT3" => Some(Apartment::Unit3),
            "UNIT4" => Some(Apartment::Unit4),
            "UNIT5" => Some(Apartment::Unit5),
            _ => None,
        }
    }

    /// The unit number 1–5.
    pub fn number(&self) -> u8 {
        match self {
            Apartment::Unit1 => 1,
            Apartment::Unit2 => 2,
            Apartment::Unit3 => 3,
            Apartment::Unit4 => 4,
            Apartment::Unit5 => 5,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Apartment::Unit1),
            2 => Some(Apartment::Unit2),
            3 => Some(Apartment::Unit3),
            4 => Some(Apartment::Unit4),
            5 => Some(Apartment::Unit5),
            _ => None,
        }
    }
}

impl std::fmt::Display for Apartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One record per conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    /// Opaque unique identifier
    pub id: String,

    /// Initial UI language tag (e.g. "de")
    pub locale: String,

    /// Sticky apartment assignment; `None` until first detection
    pub apartment: Option<Apartment>,

    pub created_at: DateTime<Utc>,
}

/// Append-only transcript entry. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,

    /// Owning session
    pub session_id: String,

    /// `user` or `assistant`
    pub role: Role,

    pub content: String,

    pub created_at: DateTime<Utc>,
}

/// Durable session persistence.
///
/// Implementations: SQLite (production), in-memory (tests). Failures on this
/// boundary are non-fatal for a guest turn: the caller logs and continues
/// without a durable identity.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The backend name (e.g. "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Create a fresh session. Two concurrent calls create two sessions.
    async fn create_session(&self, locale: &str) -> Result<ChatSession, StoreError>;

    /// Look up an existing session by ID.
    async fn get_session(&self, id: &str) -> Result<Option<ChatSession>, StoreError>;

    /// Record the apartment for a session, first-write-wins.
    ///
    /// Returns `true` when this call performed the assignment, `false` when
    /// an apartment was already recorded (the call is then a no-op).
    async fn record_apartment(&self, id: &str, apartment: Apartment) -> Result<bool, StoreError>;

    /// Append one transcript entry.
    async fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ChatMessage, StoreError>;

    /// All messages for a session, in creation order.
    async fn messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apartment_parse_roundtrip() {
        for apt in Apartment::ALL {
            assert_eq!(Apartment::parse(apt.as_str()), Some(apt));
            assert_eq!(Apartment::from_number(apt.number()), Some(apt));
        }
    }

    #[test]
    fn apartment_parse_is_case_insensitive() {
        assert_eq!(Apartment::parse("unit5"), Some(Apartment::Unit5));
        assert_eq!(Apartment::parse("Unit2"), Some(Apartment::Unit2));
    }

    #[test]
    fn apartment_rejects_unknown() {
        assert_eq!(Apartment::parse("UNIT6"), None);
        assert_eq!(Apartment::from_number(0), None);
        assert_eq!(Apartment::from_number(6), None);
    }

    #[test]
    fn apartment_serde_uses_wire_form() {
        let json = serde_json::to_string(&Apartment::Unit4).unwrap();
        assert_eq!(json, "\"UNIT4\"");
        let back: Apartment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Apartment::Unit4);
    }
}
