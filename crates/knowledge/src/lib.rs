//! Knowledge corpus storage and retrieval for Innkeep.
//!
//! - `vector` — cosine similarity and in-process ranking
//! - `sqlite` — durable corpus backend
//! - `in_memory` — ephemeral backend for tests and dry-runs
//! - `chunker` — paragraph-based document chunking for ingestion
//! - `retrieval` — the query-time retrieval engine

pub mod chunker;
pub mod in_memory;
pub mod retrieval;
pub mod sqlite;
pub mod vector;

pub use in_memory::InMemoryKnowledgeStore;
pub use retrieval::RetrievalEngine;
pub use sqlite::SqliteKnowledgeStore;
