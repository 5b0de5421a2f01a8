//! Avatar provider client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, error};

use crate::types::AvatarPayload;
use docjourney_core::{Error, Result};

/// Result of probing a rendered video URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoFetch {
    Ready(Vec<u8>),
    /// The provider has not finished writing the file yet.
    Pending,
}

/// The text-to-video provider.
#[async_trait]
pub trait AvatarApi: Send + Sync {
    /// Submit a synthesis job and return the provider's raw JSON reply.
    async fn submit(&self, payload: &AvatarPayload) -> Result<serde_json::Value>;

    /// Download a rendered video, or report that it is not ready yet.
    async fn fetch_video(&self, url: &str) -> Result<VideoFetch>;
}

#[derive(Clone)]
pub struct SimliClient {
    client: Client,
    api_url: String,
}

impl SimliClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }
}

#[async_trait]
impl AvatarApi for SimliClient {
    async fn submit(&self, payload: &AvatarPayload) -> Result<serde_json::Value> {
        debug!("Submitting avatar job to {}", self.api_url);

        let response = self
            .client
            .post(&self.api_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Simli request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Simli API returned {}", status);
            return Err(Error::Upstream(format!("Simli API error: {}", body)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::UpstreamFormat(format!("Unexpected API response format: {}", e)))
    }

    async fn fetch_video(&self, url: &str) -> Result<VideoFetch> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Video download failed: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN | StatusCode::ACCEPTED => {
                debug!("Video at {} not ready ({})", url, response.status());
                Ok(VideoFetch::Pending)
            }
            status if status.is_success() => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| Error::Upstream(format!("Video download failed: {}", e)))?;
                Ok(VideoFetch::Ready(bytes.to_vec()))
            }
            status => Err(Error::Upstream(format!(
                "Failed to download video: {} returned {}",
                url, status
            ))),
        }
    }
}
