//! Translation of domain errors into HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use docjourney_core::Error;

/// An error response with a `{"detail": ...}` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, detail) = match &err {
            Error::Fetch(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Failed to fetch documentation. Please check the URL and try again.".to_string(),
            ),
            Error::Upstream(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Failed to generate explanation. Please try again later.".to_string(),
            ),
            Error::Processing(_) | Error::InvalidUrl(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An unexpected error occurred: {}", err),
            ),
        };

        if status.is_server_error() {
            error!("Request failed ({}): {}", status, err);
        } else {
            warn!("Request rejected ({}): {}", status, err);
        }
        Self::new(status, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "detail": self.detail })),
        )
            .into_response()
    }
}
