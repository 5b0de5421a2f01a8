//! Script cache row types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached, speech-ready script for one documentation domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationScript {
    pub id: i64,
    /// Domain key (e.g. `langchain`), unique.
    pub root_url: String,
    /// The full URL whose page produced this script.
    pub original_url: String,
    pub script_content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing entry for `GET /api/docs/scripts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSummary {
    pub root_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}
