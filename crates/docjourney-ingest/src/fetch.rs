//! Page retrieval.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use docjourney_core::{Error, Result};

const USER_AGENT: &str = "DocJourney/0.1 (documentation explainer)";

/// Retrieves the raw HTML body of a documentation page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fails with [`Error::Fetch`] on network failure or a non-2xx status.
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

/// reqwest-backed fetcher with a per-request timeout.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Fetch of {} failed: {}", url, e);
            Error::Fetch(format!("{}: {}", url, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Fetch of {} returned {}", url, status);
            return Err(Error::Fetch(format!("{} returned {}", url, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("{}: {}", url, e)))?;

        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}
