//! Completion-model providers.
//!
//! Only the OpenAI chat-completions API is wired up. Calls are
//! non-streaming: both callers need the whole reply before they can do
//! anything with it.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error};

use crate::types::CompletionRequest;
use docjourney_core::{Error, Result};

/// A completion model that turns a message list into one reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: docjourney_core::config::DEFAULT_OPENAI_BASE_URL.into(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let msgs: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| json!({"role": m.role, "content": m.content}))
            .collect();

        let body = json!({
            "model": request.model,
            "messages": msgs,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        debug!(
            "Completion request to {} with model {} ({} messages)",
            url,
            request.model,
            msgs.len()
        );
        let start = Instant::now();

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .inspect_err(|e| error!("Completion request failed: {}", e))
            .map_err(|e| Error::Upstream(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Completion API returned {}", status);
            return Err(Error::Upstream(format!("API error {}: {}", status, body)));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Invalid completion response: {}", e)))?;

        let content = parsed["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Error::Upstream("Completion response had no message content".into()))?;

        debug!(
            "Completion from {} finished in {}ms ({} chars)",
            request.model,
            start.elapsed().as_millis(),
            content.len()
        );

        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use crate::{CompletionSettings, CHAT_MODEL};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest::new(
            CHAT_MODEL,
            vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
            CompletionSettings::CHAT,
        )
    }

    async fn client_for(server: &MockServer) -> OpenAIClient {
        OpenAIClient::new(Some("sk-test".into()), Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "temperature": 0.7,
                "max_tokens": 500,
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Hello there"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server).await.complete(request()).await.unwrap();
        assert_eq!(reply, "Hello there");
    }

    #[tokio::test]
    async fn test_api_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.complete(request()).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(ref m) if m.contains("429")));
    }

    #[tokio::test]
    async fn test_missing_content_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.complete(request()).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_upstream() {
        let client = OpenAIClient::new(None, Duration::from_millis(500))
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let err = client.complete(request()).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
