//! REST API client for the Livy session and statement endpoints.
//!
//! Wraps the Livy HTTP API (session creation, state polling, statement
//! submission and polling, session deletion) using [`reqwest`]. No
//! retries or polling happen here; that belongs to
//! [`crate::lifecycle`].

use reqwest::StatusCode;
use salespark_core::config::LivyConfig;
use salespark_core::types::SessionId;

use crate::messages::{
    CreateSessionRequest, CreateStatementRequest, Session, SessionState, SessionStatus,
    StatementRef, StatementStatus,
};

/// HTTP client for a single Livy gateway.
pub struct LivyApi {
    client: reqwest::Client,
    api_url: String,
    kind: String,
}

/// Errors from the Livy REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum LivyApiError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Livy answered with an unexpected status code.
    #[error("Livy API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A statement was created but the response carried no `Location`.
    #[error("Livy accepted the statement but sent no Location header")]
    MissingLocation,
}

impl LivyApi {
    /// Create a new API client for the configured gateway.
    ///
    /// Every request is bounded by `config.request_timeout`, so a gateway
    /// that accepts the connection but never answers surfaces as
    /// [`LivyApiError::Request`].
    pub fn new(config: &LivyConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self::with_client(client, config)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &LivyConfig) -> Self {
        Self {
            client,
            api_url: config.url.trim_end_matches('/').to_string(),
            kind: config.session_kind.clone(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Base URL of one session, e.g. `http://host:8998/sessions/42`.
    pub fn session_url(&self, id: SessionId) -> String {
        format!("{}/sessions/{}", self.api_url, id)
    }

    /// Start a new interactive session.
    ///
    /// Sends `POST /sessions` with the configured `kind`. Any 2xx status
    /// counts as success.
    pub async fn create_session(&self) -> Result<Session, LivyApiError> {
        let response = self
            .client
            .post(format!("{}/sessions", self.api_url))
            .json(&CreateSessionRequest { kind: &self.kind })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the current state of a session via `GET /sessions/{id}`.
    pub async fn session_state(&self, id: SessionId) -> Result<SessionState, LivyApiError> {
        let response = self.client.get(self.session_url(id)).send().await?;
        let status: SessionStatus = Self::parse_response(response).await?;
        Ok(status.state)
    }

    /// Submit code to a session.
    ///
    /// Sends `POST /sessions/{id}/statements`. Livy answers `201 Created`
    /// with a `Location` header naming the statement; any other status is
    /// returned as [`LivyApiError::ApiError`] carrying the response body.
    pub async fn submit_statement(
        &self,
        id: SessionId,
        code: &str,
    ) -> Result<StatementRef, LivyApiError> {
        let response = self
            .client
            .post(format!("{}/statements", self.session_url(id)))
            .json(&CreateStatementRequest {
                code,
                kind: &self.kind,
            })
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(Self::api_error(response).await);
        }

        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(StatementRef::new)
            .ok_or(LivyApiError::MissingLocation)
    }

    /// Fetch statement progress (and output, once terminal).
    pub async fn statement_status(
        &self,
        statement: &StatementRef,
    ) -> Result<StatementStatus, LivyApiError> {
        let response = self
            .client
            .get(statement.url(&self.api_url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Delete a session, best-effort.
    ///
    /// Failures are logged and swallowed so cleanup can never replace the
    /// outcome the caller is about to receive.
    pub async fn delete_session(&self, id: SessionId) {
        match self.client.delete(self.session_url(id)).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(session_id = id, "Livy session deleted");
            }
            Ok(response) => {
                let err = Self::api_error(response).await;
                tracing::warn!(session_id = id, error = %err, "Livy refused session deletion");
            }
            Err(e) => {
                tracing::warn!(session_id = id, error = %e, "Failed to delete Livy session");
            }
        }
    }

    /// Lightweight reachability probe via `GET /sessions`.
    pub async fn ping(&self) -> Result<(), LivyApiError> {
        let response = self
            .client
            .get(format!("{}/sessions", self.api_url))
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    // ---- private helpers ----

    /// Build an [`LivyApiError::ApiError`] from a response, consuming its body.
    async fn api_error(response: reqwest::Response) -> LivyApiError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        LivyApiError::ApiError { status, body }
    }

    /// Ensure the response has a success status code.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, LivyApiError> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, LivyApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
