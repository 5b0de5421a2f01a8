//! DocJourney Store — SQLite-backed script cache keyed by documentation domain.

pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::ScriptStore;
pub use types::*;
