//! Documentation-grounded chat over an external completion model.
//!
//! The completion model sits behind [`CompletionClient`] so the ingestion
//! pipeline and chat service can share one process-wide client, and tests
//! can swap in a recording fake.

pub mod config;
pub mod providers;
pub mod service;
pub mod types;

pub use config::{CompletionSettings, CHAT_MODEL};
pub use providers::{CompletionClient, OpenAIClient};
pub use service::ChatService;
pub use types::*;
