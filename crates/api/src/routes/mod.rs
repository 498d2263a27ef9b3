pub mod health;
pub mod info;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /info                      service metadata (GET, HEAD)
///
/// /jobs                      list (GET), submit multipart (POST)
/// /jobs/{id}                 get status (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(info::api_router())
        .nest("/jobs", jobs::router())
}
