//! # Innkeep Tools
//!
//! Implementations of the model-invocable [`Tool`](innkeep_core::Tool)
//! trait. Currently a single tool: live web search for weather, opening
//! hours, and other time-sensitive questions the knowledge base cannot
//! answer.

pub mod web_search;

pub use web_search::{WebSearchClient, WebSearchTool};
