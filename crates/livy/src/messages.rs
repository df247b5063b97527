//! Livy REST payload types.
//!
//! Livy reports session and statement states as lowercase strings. Known
//! values map to enum variants; anything else is kept verbatim in an
//! `Other` variant so a newer gateway never breaks polling.

use std::fmt;

use serde::{Deserialize, Serialize};
use salespark_core::types::SessionId;

/// Lifecycle state of a Livy interactive session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SessionState {
    NotStarted,
    Starting,
    /// Ready to accept a statement.
    Idle,
    Busy,
    ShuttingDown,
    Error,
    Dead,
    Killed,
    Success,
    Other(String),
}

impl From<String> for SessionState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "not_started" => SessionState::NotStarted,
            "starting" => SessionState::Starting,
            "idle" => SessionState::Idle,
            "busy" => SessionState::Busy,
            "shutting_down" => SessionState::ShuttingDown,
            "error" => SessionState::Error,
            "dead" => SessionState::Dead,
            "killed" => SessionState::Killed,
            "success" => SessionState::Success,
            _ => SessionState::Other(raw),
        }
    }
}

impl SessionState {
    pub fn as_str(&self) -> &str {
        match self {
            SessionState::NotStarted => "not_started",
            SessionState::Starting => "starting",
            SessionState::Idle => "idle",
            SessionState::Busy => "busy",
            SessionState::ShuttingDown => "shutting_down",
            SessionState::Error => "error",
            SessionState::Dead => "dead",
            SessionState::Killed => "killed",
            SessionState::Success => "success",
            SessionState::Other(raw) => raw,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of a submitted statement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum StatementState {
    Waiting,
    Running,
    /// Finished; `output` is populated.
    Available,
    Error,
    Cancelling,
    Cancelled,
    Other(String),
}

impl From<String> for StatementState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "waiting" => StatementState::Waiting,
            "running" => StatementState::Running,
            "available" => StatementState::Available,
            "error" => StatementState::Error,
            "cancelling" => StatementState::Cancelling,
            "cancelled" => StatementState::Cancelled,
            _ => StatementState::Other(raw),
        }
    }
}

impl StatementState {
    pub fn as_str(&self) -> &str {
        match self {
            StatementState::Waiting => "waiting",
            StatementState::Running => "running",
            StatementState::Available => "available",
            StatementState::Error => "error",
            StatementState::Cancelling => "cancelling",
            StatementState::Cancelled => "cancelled",
            StatementState::Other(raw) => raw,
        }
    }

    /// No further progress happens without a new submission.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StatementState::Available | StatementState::Error | StatementState::Cancelled
        )
    }
}

impl fmt::Display for StatementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for `POST /sessions`.
#[derive(Debug, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub kind: &'a str,
}

/// Request body for `POST /sessions/{id}/statements`.
#[derive(Debug, Serialize)]
pub struct CreateStatementRequest<'a> {
    pub code: &'a str,
    pub kind: &'a str,
}

/// Response of `POST /sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    /// Gateway-assigned identifier.
    pub id: SessionId,
    /// State at creation time, usually `starting`.
    #[serde(default)]
    pub state: Option<SessionState>,
}

/// Response of `GET /sessions/{id}`; other fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStatus {
    pub state: SessionState,
}

/// Location of a submitted statement, as returned in the `Location` header
/// (e.g. `/sessions/42/statements/0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRef {
    pub location: String,
}

impl StatementRef {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Absolute URL for polling, resolving a relative location against `api_url`.
    pub fn url(&self, api_url: &str) -> String {
        if self.location.starts_with("http://") || self.location.starts_with("https://") {
            self.location.clone()
        } else if self.location.starts_with('/') {
            format!("{api_url}{}", self.location)
        } else {
            format!("{api_url}/{}", self.location)
        }
    }
}

/// Response of `GET /sessions/{id}/statements/{n}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementStatus {
    #[serde(default)]
    pub id: Option<i64>,
    pub state: StatementState,
    /// Present once the statement reaches a terminal state.
    #[serde(default)]
    pub output: Option<StatementOutput>,
}

/// Whether the engine considers the statement successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStatus {
    Ok,
    Error,
    #[serde(other)]
    Unknown,
}

/// Terminal output block of a statement.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementOutput {
    pub status: OutputStatus,
    #[serde(default)]
    pub execution_count: Option<i64>,
    /// MIME-keyed payloads; only `text/plain` is consumed.
    #[serde(default)]
    pub data: Option<OutputData>,
    /// Exception class name on failure.
    #[serde(default)]
    pub ename: Option<String>,
    /// Exception message on failure.
    #[serde(default)]
    pub evalue: Option<String>,
    #[serde(default)]
    pub traceback: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputData {
    #[serde(rename = "text/plain", default)]
    pub text_plain: Option<String>,
}

impl StatementOutput {
    /// The `text/plain` payload, if the engine produced one.
    pub fn text(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.text_plain.as_deref())
    }
}
