//! # Innkeep Core
//!
//! Domain types, traits, and error definitions for the Innkeep guest
//! assistant. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (language model, embedding service, knowledge
//! store, session store, web search, human-notification gateway) is defined
//! as a trait here. Implementations live in their respective crates. This
//! enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod knowledge;
pub mod lang;
pub mod message;
pub mod notify;
pub mod provider;
pub mod session;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use knowledge::{KnowledgeChunk, KnowledgeStore, RetrievalResult, ScoredChunk};
pub use lang::Language;
pub use message::{Message, MessageToolCall, Role};
pub use notify::{HandoffNotice, Notifier};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use session::{Apartment, ChatMessage, ChatSession, SessionStore};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
