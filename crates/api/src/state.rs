use std::sync::Arc;

use salespark_livy::lifecycle::QueryRunner;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; holds no mutable state. Each query run creates its own
/// Livy session through the shared runner.
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle controller bound to the configured gateway.
    pub runner: Arc<QueryRunner>,
}
