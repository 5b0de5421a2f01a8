//! Model selection and sampling settings.

/// The only model this service talks to: low cost, good enough for
/// conversational explanations.
pub const CHAT_MODEL: &str = "gpt-4o-mini";

/// Sampling settings for one kind of completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSettings {
    pub temperature: f64,
    pub max_tokens: usize,
}

impl CompletionSettings {
    /// Documentation chat replies.
    pub const CHAT: Self = Self {
        temperature: 0.7,
        max_tokens: 500,
    };

    /// Explanation script generation.
    pub const SCRIPT: Self = Self {
        temperature: 0.7,
        max_tokens: 1000,
    };
}
