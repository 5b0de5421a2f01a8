//! Chat routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;
use docjourney_chat::{ChatRequest, ChatResponse};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat/send", post(send_message))
}

/// POST /api/chat/send
async fn send_message(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = state
        .chat
        .chat(req.doc_url.as_deref(), &req.messages)
        .await?;

    Ok(Json(ChatResponse {
        response,
        audio_url: None,
    }))
}
