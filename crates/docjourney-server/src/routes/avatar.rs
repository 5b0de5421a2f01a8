//! Avatar video routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tracing::error;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;
use docjourney_avatar::{AvatarRequest, AvatarResponse};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/avatar/generate", post(generate))
}

/// POST /api/avatar/generate — every failure is reported as a 500.
async fn generate(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AvatarRequest>,
) -> Result<Json<AvatarResponse>, ApiError> {
    let video = state
        .avatar
        .synthesize(&req.text, req.face_id.as_deref(), req.voice_id.as_deref())
        .await
        .map_err(|e| {
            error!("Avatar generation failed: {}", e);
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error generating avatar video: {}", e),
            )
        })?;

    Ok(Json(AvatarResponse {
        success: true,
        message: "Avatar video generated successfully".into(),
        video_url: Some(video.video_url),
        hls_url: video.hls_url,
    }))
}
