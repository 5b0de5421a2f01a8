//! HTTP route handlers.

pub mod avatar;
pub mod chat;
pub mod docs;
pub mod health;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = ServeDir::new(&state.config.data_paths.static_dir);
    let cors = cors_layer(&state.config.frontend_origin);

    Router::new()
        .merge(health::root_routes())
        .nest("/api", api_routes())
        .nest_service("/static", static_dir)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(docs::routes())
        .merge(chat::routes())
        .merge(avatar::routes())
}

/// Credentialed CORS for the single frontend origin. Methods and headers
/// are mirrored since wildcards are not allowed with credentials.
fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match HeaderValue::from_str(origin) {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            warn!("Ignoring invalid FRONTEND_ORIGIN {:?}", origin);
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
