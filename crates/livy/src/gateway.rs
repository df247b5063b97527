//! The seam between the lifecycle controller and the Livy gateway.
//!
//! [`crate::lifecycle::QueryRunner`] only ever talks to a `dyn Gateway`,
//! so the state machine can be driven by scripted gateways in tests.

use async_trait::async_trait;
use salespark_core::types::SessionId;

use crate::api::{LivyApi, LivyApiError};
use crate::messages::{Session, SessionState, StatementRef, StatementStatus};

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn create_session(&self) -> Result<Session, LivyApiError>;

    async fn session_state(&self, id: SessionId) -> Result<SessionState, LivyApiError>;

    async fn submit_statement(
        &self,
        id: SessionId,
        code: &str,
    ) -> Result<StatementRef, LivyApiError>;

    async fn statement_status(
        &self,
        statement: &StatementRef,
    ) -> Result<StatementStatus, LivyApiError>;

    /// Best-effort; implementations log failures instead of returning them.
    async fn delete_session(&self, id: SessionId);

    async fn ping(&self) -> Result<(), LivyApiError> {
        Ok(())
    }
}

#[async_trait]
impl Gateway for LivyApi {
    async fn create_session(&self) -> Result<Session, LivyApiError> {
        LivyApi::create_session(self).await
    }

    async fn session_state(&self, id: SessionId) -> Result<SessionState, LivyApiError> {
        LivyApi::session_state(self, id).await
    }

    async fn submit_statement(
        &self,
        id: SessionId,
        code: &str,
    ) -> Result<StatementRef, LivyApiError> {
        LivyApi::submit_statement(self, id, code).await
    }

    async fn statement_status(
        &self,
        statement: &StatementRef,
    ) -> Result<StatementStatus, LivyApiError> {
        LivyApi::statement_status(self, statement).await
    }

    async fn delete_session(&self, id: SessionId) {
        LivyApi::delete_session(self, id).await
    }

    async fn ping(&self) -> Result<(), LivyApiError> {
        LivyApi::ping(self).await
    }
}
