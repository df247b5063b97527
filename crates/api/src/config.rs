use salespark_core::config::{DatasetConfig, LifecycleTiming, LivyConfig};
use salespark_core::error::CoreError;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running next to a local Livy
/// (or an SSH tunnel to an EMR master). In production, override via
/// environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`). Must exceed the
    /// combined session and statement bounds or callers see 408s for
    /// queries that would have finished.
    pub request_timeout_secs: u64,
    /// Livy gateway location and session kind.
    pub livy: LivyConfig,
    /// Dataset the generated scripts read.
    pub dataset: DatasetConfig,
    /// Session lifecycle poll intervals and bounds.
    pub timing: LifecycleTiming,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `300`                      |
    ///
    /// Gateway, dataset and timing variables are documented in
    /// [`salespark_core::config`].
    pub fn from_env() -> Result<Self, CoreError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .map_err(|_| CoreError::Validation("PORT must be a valid u16".into()))?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .map_err(|_| CoreError::Validation("REQUEST_TIMEOUT_SECS must be a valid u64".into()))?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            livy: LivyConfig::from_env()?,
            dataset: DatasetConfig::from_env(),
            timing: LifecycleTiming::from_env()?,
        })
    }
}
