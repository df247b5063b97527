pub mod health;
pub mod jobs;
pub mod queries;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /queries                                         list catalog (GET)
/// /queries/run                                     run a query (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/queries", queries::router())
}
