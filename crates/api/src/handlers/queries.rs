//! Handlers for listing and running catalog queries.
//!
//! Every run owns one Livy session for its whole lifetime. The run itself
//! is spawned onto its own task so that a caller hanging up mid-poll does
//! not drop the lifecycle future before the session is deleted.

use axum::extract::State;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use salespark_core::result::{Record, ResultSet};
use salespark_core::script::QueryKind;

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, ResultResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/v1/queries/run` (JSON) and `POST /run_job` (form).
#[derive(Debug, Deserialize)]
pub struct RunQueryRequest {
    /// Catalog identifier, e.g. `platform_exposure`.
    #[serde(default)]
    pub query: String,
}

/// One catalog entry.
#[derive(Debug, Serialize)]
pub struct QueryInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// Result of a successful run.
#[derive(Debug, Serialize)]
pub struct QueryRunResult {
    pub query: QueryKind,
    pub row_count: usize,
    pub rows: Vec<Record>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/queries
pub async fn list_queries() -> Json<DataResponse<Vec<QueryInfo>>> {
    let data = QueryKind::ALL
        .into_iter()
        .map(|kind| QueryInfo {
            name: kind.as_str(),
            description: kind.description(),
        })
        .collect();

    Json(DataResponse { data })
}

/// POST /api/v1/queries/run
///
/// Runs the named query and returns its rows with a row count.
pub async fn run_query(
    State(state): State<AppState>,
    Json(input): Json<RunQueryRequest>,
) -> AppResult<Json<DataResponse<QueryRunResult>>> {
    let query = resolve_query(&input.query)?;
    let result = execute(&state, query).await?;

    Ok(Json(DataResponse {
        data: QueryRunResult {
            query,
            row_count: result.len(),
            rows: result.rows,
        },
    }))
}

/// POST /run_job
///
/// Form-encoded variant used by the dashboard page. Responds with
/// `{ "result": [...] }` on success.
pub async fn run_job(
    State(state): State<AppState>,
    Form(input): Form<RunQueryRequest>,
) -> AppResult<Json<ResultResponse<ResultSet>>> {
    let query = resolve_query(&input.query)?;
    let result = execute(&state, query).await?;

    Ok(Json(ResultResponse { result }))
}

/// A missing or blank name is a malformed request; anything else is
/// looked up in the catalog.
fn resolve_query(raw: &str) -> AppResult<QueryKind> {
    if raw.trim().is_empty() {
        return Err(AppError::BadRequest("query is required".to_string()));
    }
    Ok(raw.parse()?)
}

/// Run `query` on a detached task and wait for it.
async fn execute(state: &AppState, query: QueryKind) -> AppResult<ResultSet> {
    tracing::info!(query = %query, "Running query");

    let runner = state.runner.clone();
    let handle = tokio::spawn(async move { runner.run(query).await });

    let outcome = handle
        .await
        .map_err(|e| AppError::InternalError(format!("Query task failed: {e}")))?;

    Ok(outcome?)
}
