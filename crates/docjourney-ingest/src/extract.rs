//! HTML → speakable plain text.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::fetch::PageFetcher;
use docjourney_core::Result;

/// Content containers, most specific first.
const CONTENT_SELECTORS: &[&str] = &["main", "article", "div.content"];

static FENCED_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[\s\S]*?```").unwrap());
static INLINE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`.*?`").unwrap());
static DISALLOWED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,!?-]").unwrap());

/// Fetches pages and reduces them to clean text.
#[derive(Clone)]
pub struct TextExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl TextExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch `url` and return its cleaned text, one block per line.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let html = self.fetcher.fetch_html(url).await?;
        let text = clean_text(&extract_text(&html));
        debug!("Extracted {} chars of text from {}", text.len(), url);
        Ok(text)
    }
}

/// Extract visible text from an HTML document.
///
/// Prefers `<main>`, then `<article>`, then a `div.content` container, and
/// falls back to the whole document. `<script>` and `<style>` contents are
/// skipped. Each text node is trimmed and non-empty ones are joined with
/// newlines.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let root = CONTENT_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    visible_text_blocks(root).join("\n")
}

fn visible_text_blocks(root: ElementRef<'_>) -> Vec<&str> {
    root.descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let hidden = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| matches!(e.name(), "script" | "style"))
                });
                if hidden {
                    None
                } else {
                    Some(text.trim())
                }
            }
            _ => None,
        })
        .filter(|t| !t.is_empty())
        .collect()
}

/// Strip code and special characters, keeping one trimmed non-empty line
/// per original line.
pub fn clean_text(text: &str) -> String {
    let text = FENCED_CODE_RE.replace_all(text, "");
    let text = INLINE_CODE_RE.replace_all(&text, "");
    let text = DISALLOWED_RE.replace_all(&text, "");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
