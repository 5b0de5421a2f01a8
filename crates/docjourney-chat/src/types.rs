//! Chat types matching the frontend API surface.

use serde::{Deserialize, Serialize};

use crate::config::CompletionSettings;

/// Chat message in conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// A single non-streaming completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: usize,
}

impl CompletionRequest {
    pub fn new(model: &str, messages: Vec<ChatMessage>, settings: CompletionSettings) -> Self {
        Self {
            model: model.to_string(),
            messages,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

/// Incoming chat request (`POST /api/chat/send`).
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub doc_url: Option<String>,
}

/// Chat reply. `audio_url` is always null for now but stays in the shape
/// the frontend expects.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub audio_url: Option<String>,
}
