use axum::routing::post;
use axum::Router;

use crate::handlers::queries;
use crate::state::AppState;

/// Mount the form-encoded job endpoint at root level.
///
/// ```text
/// POST   /run_job                   -> run_job
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/run_job", post(queries::run_job))
}
