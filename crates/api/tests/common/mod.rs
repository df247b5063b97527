#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use salespark_api::config::ServerConfig;
use salespark_api::router::build_app_router;
use salespark_api::state::AppState;
use salespark_core::config::{DatasetConfig, LifecycleTiming, LivyConfig};
use salespark_core::types::SessionId;
use salespark_livy::api::LivyApiError;
use salespark_livy::gateway::Gateway;
use salespark_livy::lifecycle::QueryRunner;
use salespark_livy::messages::{Session, SessionState, StatementRef, StatementStatus};

// ---------------------------------------------------------------------------
// Fake gateway
// ---------------------------------------------------------------------------

/// In-memory gateway that answers every poll with the same canned state.
pub struct FakeGateway {
    pub session_state: &'static str,
    pub statement: Value,
    pub reachable: bool,
    pub created: AtomicUsize,
    pub deleted: Mutex<Vec<SessionId>>,
    pub submitted: Mutex<Vec<String>>,
}

impl FakeGateway {
    /// Idle session; statement completes with `text`.
    pub fn returning(text: &str) -> Self {
        Self::with_statement(json!({
            "id": 0,
            "state": "available",
            "output": {"status": "ok", "execution_count": 0, "data": {"text/plain": text}}
        }))
    }

    /// Idle session; statement completes with an engine error.
    pub fn failing(evalue: &str) -> Self {
        Self::with_statement(json!({
            "id": 0,
            "state": "available",
            "output": {"status": "error", "ename": "AnalysisException", "evalue": evalue}
        }))
    }

    pub fn with_statement(statement: Value) -> Self {
        Self {
            session_state: "idle",
            statement,
            reachable: true,
            created: AtomicUsize::new(0),
            deleted: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn deleted(&self) -> Vec<SessionId> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }
}

fn unavailable() -> LivyApiError {
    LivyApiError::ApiError {
        status: 503,
        body: "Service Unavailable".to_string(),
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn create_session(&self) -> Result<Session, LivyApiError> {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::from_value(json!({"id": 100 + n, "state": "starting"})).unwrap())
    }

    async fn session_state(&self, _id: SessionId) -> Result<SessionState, LivyApiError> {
        Ok(SessionState::from(self.session_state.to_string()))
    }

    async fn submit_statement(
        &self,
        id: SessionId,
        code: &str,
    ) -> Result<StatementRef, LivyApiError> {
        self.submitted.lock().unwrap().push(code.to_string());
        Ok(StatementRef::new(format!("/sessions/{id}/statements/0")))
    }

    async fn statement_status(
        &self,
        _statement: &StatementRef,
    ) -> Result<StatementStatus, LivyApiError> {
        Ok(serde_json::from_value(self.statement.clone()).unwrap())
    }

    async fn delete_session(&self, id: SessionId) {
        self.deleted.lock().unwrap().push(id);
    }

    async fn ping(&self) -> Result<(), LivyApiError> {
        if self.reachable {
            Ok(())
        } else {
            Err(unavailable())
        }
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Millisecond-scale lifecycle bounds so timeouts resolve quickly.
pub fn fast_timing() -> LifecycleTiming {
    LifecycleTiming {
        ready_poll_interval: Duration::from_millis(5),
        ready_timeout: Duration::from_millis(100),
        statement_poll_interval: Duration::from_millis(5),
        statement_timeout: Duration::from_millis(100),
        cleanup_grace: Duration::ZERO,
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        livy: LivyConfig::default(),
        dataset: DatasetConfig::default(),
        timing: fast_timing(),
    }
}

/// Build the full application router over `gateway`, using the same
/// middleware stack as production.
pub fn build_test_app(gateway: Arc<FakeGateway>) -> Router {
    let config = test_config();
    let runner = QueryRunner::new(gateway, config.dataset.clone(), config.timing);

    let state = AppState {
        runner: Arc::new(runner),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_form(app: Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
