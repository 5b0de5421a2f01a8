//! Error types for DocJourney.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("{0}")]
    Processing(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("{0}")]
    UpstreamFormat(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Script already cached for key: {0}")]
    DuplicateKey(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
