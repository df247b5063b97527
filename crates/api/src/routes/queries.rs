//! Route definitions for the query catalog endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::queries;
use crate::state::AppState;

/// Routes mounted at `/api/v1/queries`.
///
/// ```text
/// GET    /                          -> list_queries
/// POST   /run                       -> run_query
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(queries::list_queries))
        .route("/run", post(queries::run_query))
}
