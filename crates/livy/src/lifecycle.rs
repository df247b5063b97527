//! Per-request Livy session lifecycle.
//!
//! [`QueryRunner::run`] drives one ephemeral session through
//!
//! ```text
//! Creating -> AwaitingReady -> Submitting -> AwaitingComplete -> Succeeded | Failed
//! ```
//!
//! and releases the session on every exit path once it exists. One
//! request gets one session and at most one statement; nothing is pooled
//! or retried.

use std::fmt;
use std::sync::Arc;

use salespark_core::config::{DatasetConfig, LifecycleTiming};
use salespark_core::error::{CoreError, ErrorCategory};
use salespark_core::result::{decode_result, ResultSet};
use salespark_core::script::{build_script, QueryKind};
use salespark_core::types::SessionId;

use crate::api::LivyApiError;
use crate::gateway::Gateway;
use crate::lease::SessionLease;
use crate::messages::StatementRef;
use crate::polling::{classify_session, classify_statement, CompletionPoll, PollWindow, ReadyPoll};

/// Stages of the session state machine, used for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Creating,
    AwaitingReady,
    Submitting,
    AwaitingComplete,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Creating => "creating",
            Stage::AwaitingReady => "awaiting_ready",
            Stage::Submitting => "submitting",
            Stage::AwaitingComplete => "awaiting_complete",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// Why a query run failed. Messages are shown to end users.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Unknown query '{0}'")]
    UnknownQuery(String),

    #[error("Could not create Livy session: {0}")]
    GatewaySession(#[source] LivyApiError),

    #[error("Spark session did not become idle within {waited_secs}s")]
    SessionStartTimeout { waited_secs: u64 },

    #[error("Failed to submit statement to Livy: {body}")]
    SubmissionRejected { status: u16, body: String },

    #[error("Livy unreachable while submitting statement: {0}")]
    GatewayUnreachable(#[source] LivyApiError),

    #[error("Job timed out after {waited_secs}s")]
    ExecutionTimeout { waited_secs: u64 },

    #[error("Spark job failed during execution: {0}")]
    Execution(String),

    #[error("Spark job returned an unreadable result: {0}")]
    MalformedResult(String),
}

impl RunError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RunError::UnknownQuery(_) => ErrorCategory::UnknownQuery,
            RunError::GatewaySession(_) => ErrorCategory::GatewaySessionError,
            RunError::SessionStartTimeout { .. } => ErrorCategory::SessionStartTimeout,
            RunError::SubmissionRejected { .. } => ErrorCategory::SubmissionRejected,
            RunError::GatewayUnreachable(_) => ErrorCategory::GatewayUnreachable,
            RunError::ExecutionTimeout { .. } => ErrorCategory::ExecutionTimeout,
            RunError::Execution(_) => ErrorCategory::ExecutionError,
            RunError::MalformedResult(_) => ErrorCategory::MalformedResult,
        }
    }
}

/// Decoding only ever fails with [`CoreError::MalformedResult`]; keep its
/// detail without the core prefix.
fn malformed(err: CoreError) -> RunError {
    match err {
        CoreError::MalformedResult(detail) => RunError::MalformedResult(detail),
        other => RunError::MalformedResult(other.to_string()),
    }
}

/// Runs catalog queries on ephemeral Livy sessions.
///
/// Cheap to share behind an `Arc`; every call to [`run`](Self::run) owns
/// its own session.
pub struct QueryRunner {
    gateway: Arc<dyn Gateway>,
    dataset: DatasetConfig,
    timing: LifecycleTiming,
}

impl QueryRunner {
    pub fn new(gateway: Arc<dyn Gateway>, dataset: DatasetConfig, timing: LifecycleTiming) -> Self {
        Self {
            gateway,
            dataset,
            timing,
        }
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    pub fn timing(&self) -> &LifecycleTiming {
        &self.timing
    }

    /// Resolve `name` against the catalog, then [`run`](Self::run) it.
    ///
    /// Unknown names fail before any session is created.
    pub async fn run_named(&self, name: &str) -> Result<ResultSet, RunError> {
        let query: QueryKind = name
            .parse()
            .map_err(|_| RunError::UnknownQuery(name.trim().to_string()))?;
        self.run(query).await
    }

    /// Execute `query` on a fresh session and return its decoded rows.
    pub async fn run(&self, query: QueryKind) -> Result<ResultSet, RunError> {
        let lease = self.open_session().await?;
        let session_id = lease.session_id();

        let outcome = self.drive(session_id, query).await;

        match &outcome {
            Ok(rows) => tracing::info!(
                session_id,
                query = %query,
                row_count = rows.len(),
                "Query succeeded",
            ),
            Err(e) => tracing::warn!(
                session_id,
                query = %query,
                category = e.category().code(),
                error = %e,
                "Query failed",
            ),
        }

        tracing::debug!(session_id, stage = %Stage::Cleanup, "Entering stage");
        lease.release(self.timing.cleanup_grace).await;
        outcome
    }

    // ---- stages ----

    /// Creation is bounded by the session start timeout. If it elapses no
    /// id is known, so there is nothing to delete.
    async fn open_session(&self) -> Result<SessionLease, RunError> {
        tracing::debug!(stage = %Stage::Creating, "Entering stage");
        let bound = self.timing.ready_timeout;

        let session = match tokio::time::timeout(bound, self.gateway.create_session()).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Livy session creation failed");
                return Err(RunError::GatewaySession(e));
            }
            Err(_) => {
                tracing::error!(bound_ms = bound.as_millis() as u64, "Livy session creation did not answer");
                return Err(RunError::SessionStartTimeout {
                    waited_secs: bound.as_secs(),
                });
            }
        };

        tracing::info!(
            session_id = session.id,
            state = session.state.as_ref().map(|s| s.as_str()).unwrap_or("unknown"),
            "Livy session created",
        );
        Ok(SessionLease::new(Arc::clone(&self.gateway), session.id))
    }

    /// Everything between creation and cleanup.
    async fn drive(&self, session_id: SessionId, query: QueryKind) -> Result<ResultSet, RunError> {
        self.await_ready(session_id).await?;

        // Submission and completion share the statement window.
        let window = PollWindow::open(self.timing.statement_timeout);
        let statement = self.submit(session_id, query, &window).await?;
        let payload = self.await_completion(session_id, &statement, &window).await?;
        decode_result(&payload).map_err(malformed)
    }

    async fn await_ready(&self, session_id: SessionId) -> Result<(), RunError> {
        tracing::debug!(session_id, stage = %Stage::AwaitingReady, "Entering stage");
        let window = PollWindow::open(self.timing.ready_timeout);
        let mut attempt = 0u32;

        loop {
            if window.is_exhausted() {
                tracing::warn!(
                    session_id,
                    attempt,
                    elapsed_ms = window.elapsed().as_millis() as u64,
                    "Session start timed out",
                );
                return Err(RunError::SessionStartTimeout {
                    waited_secs: window.bound().as_secs(),
                });
            }

            attempt += 1;
            let poll =
                tokio::time::timeout(window.remaining(), self.gateway.session_state(session_id))
                    .await;
            match poll {
                Ok(Ok(state)) => {
                    if classify_session(&state) == ReadyPoll::Ready {
                        tracing::info!(
                            session_id,
                            attempt,
                            elapsed_ms = window.elapsed().as_millis() as u64,
                            "Session is idle",
                        );
                        return Ok(());
                    }
                    tracing::trace!(session_id, attempt, state = %state, "Session not ready");
                }
                // A failed poll counts against the same bound as a slow start.
                Ok(Err(e)) => {
                    tracing::warn!(session_id, attempt, error = %e, "Session state poll failed");
                }
                // Window exhausted mid-poll; the check above reports it.
                Err(_) => {
                    tracing::warn!(session_id, attempt, "Session state poll did not answer");
                    continue;
                }
            }

            tokio::time::sleep(self.timing.ready_poll_interval).await;
        }
    }

    async fn submit(
        &self,
        session_id: SessionId,
        query: QueryKind,
        window: &PollWindow,
    ) -> Result<StatementRef, RunError> {
        tracing::debug!(session_id, stage = %Stage::Submitting, "Entering stage");
        let script = build_script(query, &self.dataset);

        let submitted = tokio::time::timeout(
            window.remaining(),
            self.gateway.submit_statement(session_id, &script),
        )
        .await
        .map_err(|_| {
            tracing::warn!(session_id, "Statement submission did not answer");
            RunError::ExecutionTimeout {
                waited_secs: window.bound().as_secs(),
            }
        })?;

        let statement = submitted.map_err(|e| match e {
            LivyApiError::ApiError { status, body } => RunError::SubmissionRejected { status, body },
            LivyApiError::MissingLocation => RunError::SubmissionRejected {
                status: 201,
                body: e.to_string(),
            },
            LivyApiError::Request(_) => RunError::GatewayUnreachable(e),
        })?;

        tracing::info!(
            session_id,
            query = %query,
            location = %statement.location,
            "Statement submitted",
        );
        Ok(statement)
    }

    async fn await_completion(
        &self,
        session_id: SessionId,
        statement: &StatementRef,
        window: &PollWindow,
    ) -> Result<String, RunError> {
        tracing::debug!(session_id, stage = %Stage::AwaitingComplete, "Entering stage");
        let mut attempt = 0u32;

        loop {
            if window.is_exhausted() {
                tracing::warn!(
                    session_id,
                    attempt,
                    elapsed_ms = window.elapsed().as_millis() as u64,
                    "Statement timed out",
                );
                return Err(RunError::ExecutionTimeout {
                    waited_secs: window.bound().as_secs(),
                });
            }

            attempt += 1;
            let poll =
                tokio::time::timeout(window.remaining(), self.gateway.statement_status(statement))
                    .await;
            match poll {
                Ok(Ok(status)) => match classify_statement(&status) {
                    CompletionPoll::Pending => {
                        tracing::trace!(session_id, attempt, state = %status.state, "Statement pending");
                    }
                    CompletionPoll::Succeeded(Some(payload)) => return Ok(payload),
                    CompletionPoll::Succeeded(None) => {
                        return Err(RunError::MalformedResult(
                            "statement output has no text/plain payload".to_string(),
                        ));
                    }
                    CompletionPoll::Failed(detail) => return Err(RunError::Execution(detail)),
                },
                Ok(Err(e)) => {
                    tracing::warn!(session_id, attempt, error = %e, "Statement status poll failed");
                }
                Err(_) => {
                    tracing::warn!(session_id, attempt, "Statement status poll did not answer");
                    continue;
                }
            }

            tokio::time::sleep(self.timing.statement_poll_interval).await;
        }
    }
}
