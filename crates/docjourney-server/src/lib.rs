//! DocJourney HTTP surface: shared state, error translation, and routes.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use extract::ApiJson;
pub use routes::build_router;
pub use state::AppState;
