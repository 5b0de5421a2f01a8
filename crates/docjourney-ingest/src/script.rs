//! Explanation script generation and speech sanitizing.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use docjourney_chat::{ChatMessage, CompletionClient, CompletionRequest, CompletionSettings, CHAT_MODEL};
use docjourney_core::{Error, Result};

/// Only the head of a document is sent to the model; longer pages are
/// silently truncated.
pub const MAX_INPUT_CHARS: usize = 4000;

const SYSTEM_PROMPT: &str = "You are a friendly AI tutor who explains technical concepts in simple terms. \
Generate ONLY speakable text without any special characters, formatting, or instructions.";

static FENCED_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[\s\S]*?```").unwrap());
static INLINE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]*`").unwrap());
static MARKDOWN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*_#@`]").unwrap());
static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{2022}\x{2023}\x{2043}\x{2219}]").unwrap());
static EMOJI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\x{1F300}-\x{1F9FF}]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Turns extracted documentation text into a spoken-style explanation.
#[derive(Clone)]
pub struct ScriptGenerator {
    llm: Arc<dyn CompletionClient>,
}

impl ScriptGenerator {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// Generate a speech-ready script for `text`.
    pub async fn generate_script(&self, text: &str) -> Result<String> {
        let excerpt = truncate_chars(text, MAX_INPUT_CHARS);
        let request = CompletionRequest::new(
            CHAT_MODEL,
            vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(excerpt)),
            ],
            CompletionSettings::SCRIPT,
        );

        let reply = self.llm.complete(request).await?;
        let script = sanitize_for_speech(&reply);
        if script.is_empty() {
            return Err(Error::Processing(
                "The language model returned an empty explanation script".into(),
            ));
        }

        info!(
            "Generated script: {} chars from {} chars of documentation",
            script.len(),
            excerpt.len()
        );
        Ok(script)
    }
}

fn build_prompt(doc_text: &str) -> String {
    format!(
        "You are an AI assistant creating a script to explain technical documentation in a friendly, \
conversational way. The script should be engaging and easy to understand for non-technical users.

IMPORTANT: Write ONLY the exact words that should be spoken. Do not include any formatting, emojis, \
special characters, or narrative instructions. Write in a natural, conversational tone that flows well \
when spoken aloud.

Documentation text:
{}

Create a friendly script that:
1. Introduces the main purpose of this technology
2. Explains key concepts in simple terms
3. Provides practical examples or use cases
4. Maintains an encouraging and supportive tone

Remember: Write ONLY the words to be spoken.",
        doc_text
    )
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Make model output safe to read aloud.
///
/// Removes code spans, markdown markers, bullet glyphs and emoji, collapses
/// all whitespace to single spaces, and guarantees a space after every
/// `.`, `,`, `!` or `?` that is followed by another character.
pub fn sanitize_for_speech(text: &str) -> String {
    let text = FENCED_CODE_RE.replace_all(text, " ");
    let text = INLINE_CODE_RE.replace_all(&text, " ");
    let text = MARKDOWN_RE.replace_all(&text, "");
    let text = BULLET_RE.replace_all(&text, "");
    let text = EMOJI_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");

    let mut out = String::with_capacity(text.len() + 16);
    let mut chars = text.trim().chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if matches!(c, '.' | ',' | '!' | '?') {
            if let Some(next) = chars.peek() {
                if !next.is_whitespace() {
                    out.push(' ');
                }
            }
        }
    }
    out
}
