//! Ingestion pipeline: URL → cached script, or fetch + generate + cache.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};

use crate::extract::TextExtractor;
use crate::fetch::PageFetcher;
use crate::script::ScriptGenerator;
use docjourney_chat::CompletionClient;
use docjourney_core::{key_for_url, parse_doc_url, Error, Result};
use docjourney_store::{DocumentationScript, ScriptStore};

/// Outcome of one ingestion.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub script: DocumentationScript,
    /// True when no fetch or generation happened for this call.
    pub from_cache: bool,
}

/// Find-cached-or-fetch-and-generate workflow.
///
/// A cached script is returned as-is, even if the page has since changed.
/// First-time ingestions of one domain key are serialized, so concurrent
/// requests for a new site do the fetch and model call once.
pub struct IngestionPipeline {
    store: Arc<ScriptStore>,
    extractor: TextExtractor,
    generator: ScriptGenerator,
    inflight: DashMap<String, Arc<AsyncMutex<()>>>,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<ScriptStore>,
        fetcher: Arc<dyn PageFetcher>,
        llm: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            store,
            extractor: TextExtractor::new(fetcher),
            generator: ScriptGenerator::new(llm),
            inflight: DashMap::new(),
        }
    }

    pub async fn ingest(&self, raw_url: &str) -> Result<Ingested> {
        let url = parse_doc_url(raw_url)?;
        let root_url = key_for_url(&url);

        if let Some(script) = self.store.get(&root_url)? {
            info!("Script cache hit for {}", root_url);
            return Ok(Ingested {
                script,
                from_cache: true,
            });
        }

        let slot = InflightSlot::claim(&self.inflight, &root_url);
        let _guard = slot.lock.lock().await;
        self.ingest_new(&root_url, url.as_str()).await
    }

    async fn ingest_new(&self, root_url: &str, url: &str) -> Result<Ingested> {
        // Another request may have finished while we waited for the lock.
        if let Some(script) = self.store.get(root_url)? {
            debug!("Script for {} cached while waiting", root_url);
            return Ok(Ingested {
                script,
                from_cache: true,
            });
        }

        info!("Script cache miss for {}, processing {}", root_url, url);

        let text = self.extractor.fetch_text(url).await?;
        if text.is_empty() {
            return Err(Error::Processing(format!(
                "No readable documentation text found at {}",
                url
            )));
        }

        let script = self.generator.generate_script(&text).await?;
        let (row, created) = self.store.find_or_create(root_url, url, &script)?;

        Ok(Ingested {
            script: row,
            from_cache: !created,
        })
    }
}

/// A claim on the per-key ingestion lock. Dropping it (including when the
/// request future is cancelled) removes the map entry once no other
/// request holds it.
struct InflightSlot<'a> {
    inflight: &'a DashMap<String, Arc<AsyncMutex<()>>>,
    key: &'a str,
    lock: Arc<AsyncMutex<()>>,
}

impl<'a> InflightSlot<'a> {
    fn claim(inflight: &'a DashMap<String, Arc<AsyncMutex<()>>>, key: &'a str) -> Self {
        let lock = inflight.entry(key.to_string()).or_default().value().clone();
        Self {
            inflight,
            key,
            lock,
        }
    }
}

impl Drop for InflightSlot<'_> {
    fn drop(&mut self) {
        // One reference in the map, one here: nobody else is waiting.
        self.inflight.remove_if(self.key, |_, l| {
            Arc::ptr_eq(l, &self.lock) && Arc::strong_count(l) == 2
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docjourney_chat::CompletionRequest;
    use parking_lot::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    const PAGE: &str = "<html><body><main><h1>Tokio</h1><p>An async runtime.</p></main></body></html>";

    #[derive(Default)]
    struct CountingFetcher {
        urls: Mutex<Vec<String>>,
        fail: bool,
        html: Option<&'static str>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl PageFetcher for CountingFetcher {
        async fn fetch_html(&self, url: &str) -> Result<String> {
            self.urls.lock().push(url.to_string());
            tokio::time::sleep(self.delay.unwrap_or(Duration::from_millis(20))).await;
            if self.fail {
                return Err(Error::Fetch(format!("{} returned 503", url)));
            }
            Ok(self.html.unwrap_or(PAGE).to_string())
        }
    }

    #[derive(Default)]
    struct CountingClient {
        calls: Mutex<usize>,
        fail: bool,
    }

    #[async_trait]
    impl CompletionClient for CountingClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<String> {
            *self.calls.lock() += 1;
            if self.fail {
                return Err(Error::Upstream("quota exceeded".into()));
            }
            Ok("Meet **Tokio**!It runs async Rust.".into())
        }
    }

    struct Harness {
        pipeline: IngestionPipeline,
        store: Arc<ScriptStore>,
        fetcher: Arc<CountingFetcher>,
        llm: Arc<CountingClient>,
        _dir: TempDir,
    }

    fn harness(fetcher: CountingFetcher, llm: CountingClient) -> Harness {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ScriptStore::open(dir.path().join("scripts.db")).unwrap());
        let fetcher = Arc::new(fetcher);
        let llm = Arc::new(llm);
        let pipeline = IngestionPipeline::new(store.clone(), fetcher.clone(), llm.clone());
        Harness {
            pipeline,
            store,
            fetcher,
            llm,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_second_ingest_hits_cache() {
        let h = harness(CountingFetcher::default(), CountingClient::default());
        let url = "https://tokio.rs/tokio/tutorial";

        let first = h.pipeline.ingest(url).await.unwrap();
        assert!(!first.from_cache);
        assert_eq!(first.script.root_url, "tokio");
        assert_eq!(first.script.script_content, "Meet Tokio! It runs async Rust.");

        let second = h.pipeline.ingest(url).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.script.script_content, first.script.script_content);

        assert_eq!(h.fetcher.urls.lock().len(), 1);
        assert_eq!(*h.llm.calls.lock(), 1);
        assert!(h.pipeline.inflight.is_empty());
    }

    #[tokio::test]
    async fn test_sibling_subdomains_share_one_script() {
        let h = harness(CountingFetcher::default(), CountingClient::default());

        let a = h.pipeline.ingest("https://a.example.com/guide").await.unwrap();
        let b = h.pipeline.ingest("https://b.example.com/other").await.unwrap();

        assert!(!a.from_cache);
        assert!(b.from_cache);
        assert_eq!(a.script.id, b.script.id);
        assert_eq!(b.script.original_url, "https://a.example.com/guide");
        assert_eq!(*h.fetcher.urls.lock(), vec!["https://a.example.com/guide".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_first_ingests_do_work_once() {
        let h = harness(CountingFetcher::default(), CountingClient::default());

        let (r1, r2, r3) = tokio::join!(
            h.pipeline.ingest("https://docs.example.com/a"),
            h.pipeline.ingest("https://api.example.com/b"),
            h.pipeline.ingest("https://example.com/c"),
        );
        let results = [r1.unwrap(), r2.unwrap(), r3.unwrap()];

        assert_eq!(results.iter().filter(|r| !r.from_cache).count(), 1);
        assert!(results.iter().all(|r| r.script.id == results[0].script.id));
        assert_eq!(h.fetcher.urls.lock().len(), 1);
        assert_eq!(*h.llm.calls.lock(), 1);
        assert_eq!(h.store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_commits_nothing() {
        let h = harness(
            CountingFetcher {
                fail: true,
                ..Default::default()
            },
            CountingClient::default(),
        );

        let err = h.pipeline.ingest("https://tokio.rs/").await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        assert_eq!(*h.llm.calls.lock(), 0);
        assert!(h.store.get("tokio").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upstream_failure_commits_nothing() {
        let h = harness(
            CountingFetcher::default(),
            CountingClient {
                fail: true,
                ..Default::default()
            },
        );

        let err = h.pipeline.ingest("https://tokio.rs/").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
        assert_eq!(h.store.count().unwrap(), 0);

        // A later attempt retries from scratch.
        let err = h.pipeline.ingest("https://tokio.rs/").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
        assert_eq!(h.fetcher.urls.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_page_is_processing_error() {
        let h = harness(
            CountingFetcher {
                html: Some("<html><body><main><script>x()</script></main></body></html>"),
                ..Default::default()
            },
            CountingClient::default(),
        );

        let err = h.pipeline.ingest("https://empty.dev/").await.unwrap_err();
        assert!(matches!(err, Error::Processing(_)));
        assert_eq!(*h.llm.calls.lock(), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_io() {
        let h = harness(CountingFetcher::default(), CountingClient::default());

        let err = h.pipeline.ingest("not-a-url").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
        assert!(h.fetcher.urls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_ingests_release_inflight_locks() {
        let h = harness(
            CountingFetcher {
                delay: Some(Duration::from_secs(5)),
                ..Default::default()
            },
            CountingClient::default(),
        );

        for i in 0..20 {
            let url = format!("https://site{}.dev/docs", i);
            let outcome =
                tokio::time::timeout(Duration::from_millis(5), h.pipeline.ingest(&url)).await;
            assert!(outcome.is_err());
        }
        assert!(h.pipeline.inflight.is_empty());

        // Cancelled while one request holds the lock and another waits on it.
        let outcome = tokio::time::timeout(Duration::from_millis(5), async {
            tokio::join!(
                h.pipeline.ingest("https://a.shared.dev/"),
                h.pipeline.ingest("https://b.shared.dev/"),
            )
        })
        .await;
        assert!(outcome.is_err());
        assert!(h.pipeline.inflight.is_empty());
        assert_eq!(h.store.count().unwrap(), 0);
    }
}
