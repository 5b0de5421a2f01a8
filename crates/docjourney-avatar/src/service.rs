//! Avatar synthesis: submit, wait for the rendered video, store it locally.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::{AvatarApi, VideoFetch};
use crate::types::{
    AvatarPayload, SpeechRequest, VoiceSettings, AUDIO_PROVIDER, DEFAULT_FACE_ID,
    DEFAULT_VOICE_ID, TTS_MODEL_ID,
};
use docjourney_core::{AvatarSettings, Error, Result};

/// Public URL prefix the static directory's `videos/` folder is served under.
const VIDEOS_URL_PREFIX: &str = "/static/videos";

/// A rendered video saved under the static directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarVideo {
    /// Server-relative path, e.g. `/static/videos/avatar_....mp4`.
    pub video_url: String,
    pub hls_url: Option<String>,
}

pub struct AvatarService {
    api: Arc<dyn AvatarApi>,
    settings: AvatarSettings,
    videos_dir: PathBuf,
}

impl AvatarService {
    pub fn new(api: Arc<dyn AvatarApi>, settings: AvatarSettings, videos_dir: PathBuf) -> Self {
        Self {
            api,
            settings,
            videos_dir,
        }
    }

    pub async fn synthesize(
        &self,
        text: &str,
        face_id: Option<&str>,
        voice_id: Option<&str>,
    ) -> Result<AvatarVideo> {
        let payload = self.build_payload(text, face_id, voice_id)?;
        info!(
            "Generating avatar video: face {}, {} chars of text",
            payload.face_id,
            text.chars().count()
        );

        let reply = self.api.submit(&payload).await?;
        let mp4_url = reply
            .get("mp4_url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                Error::UpstreamFormat(format!("Unexpected API response format: {}", reply))
            })?
            .to_string();
        let hls_url = reply
            .get("hls_url")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let bytes = self.wait_for_video(&mp4_url).await?;
        let video_url = self.save_video(&bytes).await?;

        Ok(AvatarVideo { video_url, hls_url })
    }

    fn build_payload(
        &self,
        text: &str,
        face_id: Option<&str>,
        voice_id: Option<&str>,
    ) -> Result<AvatarPayload> {
        let simli_api_key = self
            .settings
            .simli_api_key
            .clone()
            .ok_or_else(|| Error::Config("SIMLIAI_API_KEY is not set".into()))?;
        let tts_api_key = self
            .settings
            .elevenlabs_api_key
            .clone()
            .ok_or_else(|| Error::Config("ELEVENLABS_API_KEY is not set".into()))?;

        Ok(AvatarPayload {
            tts_api_key,
            simli_api_key,
            face_id: face_id.unwrap_or(DEFAULT_FACE_ID).to_string(),
            request_body: SpeechRequest {
                audio_provider: AUDIO_PROVIDER.into(),
                text: text.to_string(),
                voice: voice_id.unwrap_or(DEFAULT_VOICE_ID).to_string(),
                model_id: TTS_MODEL_ID.into(),
                voice_settings: VoiceSettings::default(),
            },
        })
    }

    /// Probe `url` until the provider has finalized the video.
    ///
    /// The first probe is immediate; later ones back off exponentially from
    /// `poll_interval`, capped at `poll_max_interval`.
    async fn wait_for_video(&self, url: &str) -> Result<Vec<u8>> {
        let attempts = self.settings.poll_attempts.max(1);
        let mut delay = self
            .settings
            .poll_interval
            .min(self.settings.poll_max_interval);

        for attempt in 1..=attempts {
            match self.api.fetch_video(url).await? {
                VideoFetch::Ready(bytes) => {
                    debug!("Video ready after {} probe(s)", attempt);
                    return Ok(bytes);
                }
                VideoFetch::Pending if attempt < attempts => {
                    debug!("Video not ready, retrying in {:?}", delay);
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(self.settings.poll_max_interval);
                }
                VideoFetch::Pending => {}
            }
        }

        warn!("Video at {} still not ready after {} probes", url, attempts);
        Err(Error::Upstream(format!(
            "Video was not ready after {} attempts",
            attempts
        )))
    }

    async fn save_video(&self, bytes: &[u8]) -> Result<String> {
        let file_name = video_file_name();
        tokio::fs::create_dir_all(&self.videos_dir).await?;
        tokio::fs::write(self.videos_dir.join(&file_name), bytes).await?;

        info!("Saved avatar video {} ({} bytes)", file_name, bytes.len());
        Ok(format!("{}/{}", VIDEOS_URL_PREFIX, file_name))
    }
}

fn video_file_name() -> String {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("avatar_{}_{}.mp4", stamp, &id[..8])
}
