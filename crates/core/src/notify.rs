//! Notifier trait — the outbound human-notification gateway.
//!
//! The chat engine never sends notifications itself; it only computes the
//! escalation decision. The surrounding application invokes this boundary
//! when the guest explicitly opts in to a handoff.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;
use crate::session::Apartment;

/// A handoff request forwarded to the human operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffNotice {
    /// Name the guest gave in the handoff form
    pub guest_name: String,

    /// Optional contact detail (email, phone)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_contact: Option<String>,

    /// The question the assistant could not resolve
    pub question: String,

    /// Apartment, when known for the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apartment: Option<Apartment>,

    /// Optional short conversation summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Outbound message gateway to the human operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// The gateway name (e.g. "whatsapp", "noop").
    fn name(&self) -> &str;

    /// Deliver the notice. Errors are surfaced to the caller of the handoff
    /// endpoint; the chat path never invokes this.
    async fn notify(&self, notice: &HandoffNotice) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_serializes_without_empty_fields() {
        let notice = HandoffNotice {
            guest_name: "Ana".into(),
            guest_contact: None,
            question: "Can I check out late?".into(),
            apartment: Some(Apartment::Unit2),
            summary: None,
        };
        let json = serde_json::to_string(&notice).unwrap();
        assert!(json.contains("UNIT2"));
        assert!(!json.contains("guest_contact"));
        assert!(!json.contains("summary"));
    }
}
