//! Provider implementations for Innkeep.
//!
//! - `anthropic` — Anthropic Messages API for chat completions with tool use
//! - `openai_embeddings` — OpenAI embeddings endpoint for the retrieval engine

pub mod anthropic;
pub mod openai_embeddings;

pub use anthropic::AnthropicProvider;
pub use openai_embeddings::OpenAiEmbeddings;
