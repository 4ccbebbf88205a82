//! Conversation orchestration for Innkeep.
//!
//! One guest turn flows through this crate: classify the message
//! (apartment, language), retrieve context, assemble the prompt, drive the
//! bounded tool-use exchange with the model, decide whether to surface the
//! "contact the host" affordance, and persist the transcript.

pub mod classify;
pub mod escalation;
pub mod facts;
pub mod messages;
pub mod prompt;
pub mod turn;

pub use escalation::should_escalate;
pub use messages::{fallback_answer, host_contact_message, service_apology, welcome_message};
pub use prompt::PromptAssembler;
pub use turn::{ChatEngine, EngineSettings, HistoryEntry, TurnRequest, TurnResponse};
