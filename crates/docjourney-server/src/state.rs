//! Shared application state.

use std::sync::Arc;

use docjourney_avatar::{AvatarApi, AvatarService};
use docjourney_chat::{ChatService, CompletionClient};
use docjourney_core::DocJourneyConfig;
use docjourney_ingest::{IngestionPipeline, PageFetcher};
use docjourney_store::ScriptStore;

/// Service handles owned by the process and shared by all route handlers.
pub struct AppState {
    pub config: DocJourneyConfig,
    pub store: Arc<ScriptStore>,
    pub pipeline: IngestionPipeline,
    pub chat: ChatService,
    pub avatar: AvatarService,
}

impl AppState {
    /// Wire the services together. The completion client is shared by the
    /// ingestion pipeline and chat.
    pub fn new(
        config: DocJourneyConfig,
        store: ScriptStore,
        fetcher: Arc<dyn PageFetcher>,
        llm: Arc<dyn CompletionClient>,
        avatar_api: Arc<dyn AvatarApi>,
    ) -> Self {
        let store = Arc::new(store);
        let pipeline = IngestionPipeline::new(store.clone(), fetcher, llm.clone());
        let chat = ChatService::new(store.clone(), llm);
        let avatar = AvatarService::new(
            avatar_api,
            config.avatar.clone(),
            config.data_paths.videos.clone(),
        );

        Self {
            config,
            store,
            pipeline,
            chat,
            avatar,
        }
    }
}
