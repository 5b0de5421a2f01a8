//! Documentation ingestion routes.
//! Matches /api/docs/* endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;
use docjourney_store::ScriptSummary;

const SECTIONS: [&str; 3] = ["Introduction", "Key Concepts", "Use Cases"];

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/docs/process", post(process))
        .route("/docs/scripts", get(list_scripts))
}

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub url: String,
    /// Accepted for compatibility; the response always lists the fixed sections.
    #[serde(default)]
    pub sections: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub message: String,
    pub script: String,
    pub sections: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ScriptListResponse {
    pub success: bool,
    pub scripts: Vec<ScriptSummary>,
}

// ---------------------------------------------------------------
// Process
// ---------------------------------------------------------------

/// POST /api/docs/process — return the cached script for the URL's domain,
/// or fetch, generate and cache one.
async fn process(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let ingested = state.pipeline.ingest(&req.url).await?;

    let message = if ingested.from_cache {
        "Documentation script retrieved from database"
    } else {
        "Documentation processed successfully"
    };

    Ok(Json(ProcessResponse {
        success: true,
        message: message.to_string(),
        script: ingested.script.script_content,
        sections: SECTIONS.iter().map(|s| s.to_string()).collect(),
    }))
}

// ---------------------------------------------------------------
// Listing
// ---------------------------------------------------------------

/// GET /api/docs/scripts
async fn list_scripts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScriptListResponse>, ApiError> {
    let scripts = state.store.list()?;
    Ok(Json(ScriptListResponse {
        success: true,
        scripts,
    }))
}
