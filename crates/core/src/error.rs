use serde::Serialize;

/// Errors raised by pure domain logic (catalog lookup, decoding, config).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown query '{0}'")]
    UnknownQuery(String),

    #[error("Malformed result payload: {0}")]
    MalformedResult(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl CoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::UnknownQuery(_) => ErrorCategory::UnknownQuery,
            CoreError::MalformedResult(_) => ErrorCategory::MalformedResult,
            CoreError::Validation(_) => ErrorCategory::InvalidConfig,
        }
    }
}

/// Caller-visible failure classes for a query run.
///
/// Every error that leaves the session lifecycle is tagged with exactly
/// one of these so the HTTP layer can pick a status code and clients can
/// branch on a stable string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Transport-level failure: no HTTP response from the gateway.
    GatewayUnreachable,
    /// Session creation was rejected or could not complete.
    GatewaySessionError,
    /// The session did not report `idle` within the readiness bound.
    SessionStartTimeout,
    /// The gateway refused the statement.
    SubmissionRejected,
    /// The statement did not become `available` within the completion bound.
    ExecutionTimeout,
    /// The engine ran the statement and reported a failure.
    ExecutionError,
    /// The statement succeeded but its payload could not be decoded.
    MalformedResult,
    /// The query identifier is not in the catalog.
    UnknownQuery,
    /// Startup configuration could not be parsed.
    InvalidConfig,
}

impl ErrorCategory {
    /// Stable machine-readable code, e.g. `SESSION_START_TIMEOUT`.
    pub fn code(self) -> &'static str {
        match self {
            ErrorCategory::GatewayUnreachable => "GATEWAY_UNREACHABLE",
            ErrorCategory::GatewaySessionError => "GATEWAY_SESSION_ERROR",
            ErrorCategory::SessionStartTimeout => "SESSION_START_TIMEOUT",
            ErrorCategory::SubmissionRejected => "SUBMISSION_REJECTED",
            ErrorCategory::ExecutionTimeout => "EXECUTION_TIMEOUT",
            ErrorCategory::ExecutionError => "EXECUTION_ERROR",
            ErrorCategory::MalformedResult => "MALFORMED_RESULT",
            ErrorCategory::UnknownQuery => "UNKNOWN_QUERY",
            ErrorCategory::InvalidConfig => "INVALID_CONFIG",
        }
    }
}
