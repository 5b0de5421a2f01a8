//! Avatar request/response shapes and the provider payload.

use serde::{Deserialize, Serialize};

pub const DEFAULT_FACE_ID: &str = "default";
pub const DEFAULT_VOICE_ID: &str = "pMsXgVXv3BLzUgSXRplE";
pub const AUDIO_PROVIDER: &str = "ElevenLabs";
pub const TTS_MODEL_ID: &str = "eleven_turbo_v2";

/// Incoming avatar request (`POST /api/avatar/generate`).
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarRequest {
    pub text: String,
    #[serde(default)]
    pub face_id: Option<String>,
    #[serde(default)]
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvatarResponse {
    pub success: bool,
    pub message: String,
    pub video_url: Option<String>,
    pub hls_url: Option<String>,
}

/// Voice synthesis weights sent to the speech provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.1,
            similarity_boost: 0.3,
            style: 0.2,
        }
    }
}

/// Body of a text-to-video request. Carries both provider keys, so its
/// `Debug` output redacts them.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarPayload {
    #[serde(rename = "ttsAPIKey")]
    pub tts_api_key: String,
    #[serde(rename = "simliAPIKey")]
    pub simli_api_key: String,
    #[serde(rename = "faceId")]
    pub face_id: String,
    #[serde(rename = "requestBody")]
    pub request_body: SpeechRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    #[serde(rename = "audioProvider")]
    pub audio_provider: String,
    pub text: String,
    pub voice: String,
    pub model_id: String,
    pub voice_settings: VoiceSettings,
}

impl std::fmt::Debug for AvatarPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarPayload")
            .field("tts_api_key", &"<redacted>")
            .field("simli_api_key", &"<redacted>")
            .field("face_id", &self.face_id)
            .field("request_body", &self.request_body)
            .finish()
    }
}
