//! Liveness routes.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

/// Routes mounted at the server root.
pub fn root_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(root))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

/// GET /
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Welcome to AI Documentation Journey API" }))
}

/// GET /api/health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}
