use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use salespark_core::error::{CoreError, ErrorCategory};
use salespark_livy::lifecycle::RunError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`RunError`] and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses
/// of the form `{ "error": <message>, "code": <category> }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `salespark_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed query run.
    #[error(transparent)]
    Run(#[from] RunError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => {
                let category = core.category();
                (status_for(category), category.code(), core.to_string())
            }
            AppError::Run(run) => {
                let category = run.category();
                let status = status_for(category);
                if status.is_server_error() {
                    tracing::error!(code = category.code(), error = %run, "Query run failed");
                }
                (status, category.code(), run.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// HTTP status for each failure category.
///
/// Gateway-side problems are 502, elapsed bounds are 504, and a job the
/// engine itself failed is a plain 500.
pub fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::UnknownQuery => StatusCode::BAD_REQUEST,
        ErrorCategory::GatewayUnreachable
        | ErrorCategory::GatewaySessionError
        | ErrorCategory::SubmissionRejected
        | ErrorCategory::MalformedResult => StatusCode::BAD_GATEWAY,
        ErrorCategory::SessionStartTimeout | ErrorCategory::ExecutionTimeout => {
            StatusCode::GATEWAY_TIMEOUT
        }
        ErrorCategory::ExecutionError | ErrorCategory::InvalidConfig => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
