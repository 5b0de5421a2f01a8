//! Chat about processed documentation.
//!
//! Stateless: every call carries the full conversation history, and the
//! cached script for the URL's domain is injected as the system message.
//! Chat never ingests on its own; an unprocessed site is a not-found.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{CompletionSettings, CHAT_MODEL};
use crate::providers::CompletionClient;
use crate::types::{ChatMessage, CompletionRequest};
use docjourney_core::{derive_key, Error, Result};
use docjourney_store::ScriptStore;

pub struct ChatService {
    store: Arc<ScriptStore>,
    llm: Arc<dyn CompletionClient>,
}

impl ChatService {
    pub fn new(store: Arc<ScriptStore>, llm: Arc<dyn CompletionClient>) -> Self {
        Self { store, llm }
    }

    /// Answer the latest turn of `history`, grounded in the script cached
    /// for `doc_url`'s domain.
    pub async fn chat(&self, doc_url: Option<&str>, history: &[ChatMessage]) -> Result<String> {
        let doc_url = doc_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::InvalidRequest("Documentation URL is required".into()))?;

        let root_url = derive_key(doc_url)?;
        let script = self.store.get(&root_url)?.ok_or_else(|| {
            Error::NotFound(format!(
                "No documentation found for {}. Please process the documentation first.",
                root_url
            ))
        })?;

        let messages = build_messages(&script.script_content, history);
        debug!(
            "Chat for {} with {} history messages",
            root_url,
            history.len()
        );

        let request = CompletionRequest::new(CHAT_MODEL, messages, CompletionSettings::CHAT);
        let reply = self.llm.complete(request).await?;

        info!("Chat reply for {} ({} chars)", root_url, reply.len());
        Ok(reply)
    }
}

/// Build the message array: one grounding system message, then the
/// caller's history verbatim and in order.
fn build_messages(script: &str, history: &[ChatMessage]) -> Vec<ChatMessage> {
    let system_prompt = format!(
        "You are a helpful AI assistant explaining documentation. \
         Use this documentation context to answer questions: {}\n\n\
         Keep responses conversational and easy to understand. \
         Focus on the documentation content. Keep answers concise and to the point.",
        script
    );

    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(history.iter().cloned());
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tempfile::TempDir;

    /// Records every request and answers with a fixed reply.
    #[derive(Default)]
    struct RecordingClient {
        requests: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, request: CompletionRequest) -> Result<String> {
            self.requests.lock().push(request);
            Ok("It chains LLM calls together.".into())
        }
    }

    fn setup() -> (ChatService, Arc<ScriptStore>, Arc<RecordingClient>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ScriptStore::open(dir.path().join("scripts.db")).unwrap());
        let llm = Arc::new(RecordingClient::default());
        let service = ChatService::new(store.clone(), llm.clone());
        (service, store, llm, dir)
    }

    fn history() -> Vec<ChatMessage> {
        vec![
            ChatMessage::user("What is this?"),
            ChatMessage {
                role: "assistant".into(),
                content: "A framework.".into(),
            },
            ChatMessage::user("What does it do?"),
        ]
    }

    #[tokio::test]
    async fn test_missing_url_is_invalid_request() {
        let (service, _store, llm, _dir) = setup();

        let err = service.chat(None, &history()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        let err = service.chat(Some("  "), &history()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(llm.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_uncached_site_is_not_found_without_llm_call() {
        let (service, _store, llm, _dir) = setup();

        let err = service
            .chat(Some("https://python.langchain.com/docs/"), &history())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(ref m) if m.contains("langchain")));
        assert!(llm.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_grounds_on_cached_script_and_keeps_history_order() {
        let (service, store, llm, _dir) = setup();
        let script = "LangChain helps you build apps with language models.";
        store
            .put("langchain", "https://python.langchain.com/docs/introduction/", script)
            .unwrap();

        let reply = service
            .chat(Some("https://api.langchain.com/other/page"), &history())
            .await
            .unwrap();
        assert_eq!(reply, "It chains LLM calls together.");

        let requests = llm.requests.lock();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.model, CHAT_MODEL);
        assert_eq!(req.max_tokens, 500);
        assert_eq!(req.temperature, 0.7);

        assert_eq!(req.messages[0].role, "system");
        assert!(req.messages[0].content.contains(script));
        assert_eq!(&req.messages[1..], history().as_slice());
    }
}
