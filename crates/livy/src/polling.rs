//! Pure decision logic for the two polling stages.
//!
//! The lifecycle controller owns the sleeps; everything here is
//! synchronous so stage transitions and deadline checks can be tested
//! without a gateway.

use std::time::Duration;

use tokio::time::Instant;

use crate::messages::{OutputStatus, SessionState, StatementState, StatementStatus};

/// Detail reported when a failed statement carries no `evalue`.
pub const UNKNOWN_EXECUTION_ERROR: &str = "Unknown error";

/// Elapsed-time bound for one polling stage.
///
/// Measured from stage entry on the monotonic clock, so slow gateway
/// responses shorten the number of polls rather than stretching the
/// deadline.
#[derive(Debug, Clone, Copy)]
pub struct PollWindow {
    opened_at: Instant,
    bound: Duration,
}

impl PollWindow {
    pub fn open(bound: Duration) -> Self {
        Self::opened_at(Instant::now(), bound)
    }

    pub fn opened_at(opened_at: Instant, bound: Duration) -> Self {
        Self { opened_at, bound }
    }

    pub fn bound(&self) -> Duration {
        self.bound
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.opened_at)
    }

    /// Time left before the bound is reached; zero once exhausted.
    pub fn remaining(&self) -> Duration {
        self.remaining_at(Instant::now())
    }

    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.bound.saturating_sub(self.elapsed_at(now))
    }

    /// `true` once `bound` has fully elapsed.
    pub fn is_exhausted(&self) -> bool {
        self.is_exhausted_at(Instant::now())
    }

    pub fn is_exhausted_at(&self, now: Instant) -> bool {
        self.elapsed_at(now) >= self.bound
    }
}

/// Outcome of one session-readiness poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyPoll {
    Ready,
    Pending,
}

/// Only `idle` admits a statement; every other state keeps waiting.
pub fn classify_session(state: &SessionState) -> ReadyPoll {
    match state {
        SessionState::Idle => ReadyPoll::Ready,
        _ => ReadyPoll::Pending,
    }
}

/// Outcome of one statement-completion poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionPoll {
    Pending,
    /// `available` with `status: ok`; carries the `text/plain` payload if any.
    Succeeded(Option<String>),
    /// Engine-reported failure with its error detail.
    Failed(String),
}

pub fn classify_statement(status: &StatementStatus) -> CompletionPoll {
    if !status.state.is_terminal() {
        return CompletionPoll::Pending;
    }

    match (&status.state, &status.output) {
        (StatementState::Available, Some(output)) if output.status == OutputStatus::Ok => {
            CompletionPoll::Succeeded(output.text().map(str::to_owned))
        }
        (StatementState::Available, output) => CompletionPoll::Failed(
            output
                .as_ref()
                .and_then(|o| o.evalue.clone())
                .unwrap_or_else(|| UNKNOWN_EXECUTION_ERROR.to_string()),
        ),
        // `error` / `cancelled`
        (state, output) => CompletionPoll::Failed(
            output
                .as_ref()
                .and_then(|o| o.evalue.clone())
                .unwrap_or_else(|| format!("statement ended in state '{state}'")),
        ),
    }
}
