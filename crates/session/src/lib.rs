//! Session persistence backends for Innkeep.
//!
//! - `sqlite` — durable production backend
//! - `memory` — ephemeral backend for tests

pub mod memory;
pub mod sqlite;

pub use memory::InMemorySessionStore;
pub use sqlite::SqliteSessionStore;
