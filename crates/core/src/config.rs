//! Runtime configuration for the gateway, dataset, and lifecycle timing.
//!
//! Built once at startup and passed by value (or `Arc`) into the Livy
//! client, the script builder, and the lifecycle controller.
//!
//! | Env Var                      | Default                                |
//! |------------------------------|----------------------------------------|
//! | `LIVY_URL`                   | `http://localhost:8998`                |
//! | `LIVY_SESSION_KIND`          | `pyspark`                              |
//! | `LIVY_REQUEST_TIMEOUT_SECS`  | `30`                                   |
//! | `SALES_DATA_PATH`            | [`DEFAULT_DATA_PATH`]                  |
//! | `SALES_DATA_SCHEMA`          | [`DEFAULT_SCHEMA`]                     |
//! | `SESSION_READY_POLL_SECS`    | `1`                                    |
//! | `SESSION_READY_TIMEOUT_SECS` | `60`                                   |
//! | `STATEMENT_POLL_SECS`        | `3`                                    |
//! | `STATEMENT_TIMEOUT_SECS`     | `180`                                  |
//! | `SESSION_CLEANUP_GRACE_SECS` | `2`                                    |

use std::time::Duration;

use crate::error::CoreError;

/// Livy listens on port 8998 by default.
pub const DEFAULT_LIVY_URL: &str = "http://localhost:8998";
/// Execution kind sent with both session and statement creation.
pub const DEFAULT_SESSION_KIND: &str = "pyspark";
/// HDFS location of the consolidated marketplace sales CSV.
pub const DEFAULT_DATA_PATH: &str =
    "/user/hadoop/sales_data/consolidated_market_datasets_final1.csv";
/// Spark DDL schema of the sales CSV.
pub const DEFAULT_SCHEMA: &str = "product_name STRING, brand STRING, price DOUBLE, \
rating STRING, category STRING, number_sold INT, platform STRING, product_link STRING";

/// Upper bound on any single HTTP exchange with Livy.
pub const DEFAULT_LIVY_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_READY_POLL_SECS: u64 = 1;
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_STATEMENT_POLL_SECS: u64 = 3;
pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_CLEANUP_GRACE_SECS: u64 = 2;

/// Where the Livy gateway lives and which interpreter it should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivyConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:8998`.
    pub url: String,
    /// Livy `kind` for sessions and statements.
    pub session_kind: String,
    /// Per-request HTTP timeout for the Livy client.
    pub request_timeout: Duration,
}

/// Location and layout of the dataset the generated scripts read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    pub data_path: String,
    pub schema: String,
}

/// Poll intervals and elapsed-time bounds for the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTiming {
    /// Delay between session state polls.
    pub ready_poll_interval: Duration,
    /// Maximum time to wait for the session to report `idle`.
    pub ready_timeout: Duration,
    /// Delay between statement status polls.
    pub statement_poll_interval: Duration,
    /// Maximum time to wait for the statement to become `available`.
    pub statement_timeout: Duration,
    /// Pause after issuing session deletion before returning to the caller.
    pub cleanup_grace: Duration,
}

impl Default for LivyConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LIVY_URL.to_string(),
            session_kind: DEFAULT_SESSION_KIND.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_LIVY_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            data_path: DEFAULT_DATA_PATH.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
        }
    }
}

impl Default for LifecycleTiming {
    fn default() -> Self {
        Self {
            ready_poll_interval: Duration::from_secs(DEFAULT_READY_POLL_SECS),
            ready_timeout: Duration::from_secs(DEFAULT_READY_TIMEOUT_SECS),
            statement_poll_interval: Duration::from_secs(DEFAULT_STATEMENT_POLL_SECS),
            statement_timeout: Duration::from_secs(DEFAULT_STATEMENT_TIMEOUT_SECS),
            cleanup_grace: Duration::from_secs(DEFAULT_CLEANUP_GRACE_SECS),
        }
    }
}

impl LivyConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_source(env_source)
    }

    /// Build from an arbitrary key lookup (the environment in production).
    ///
    /// A zero or non-numeric request timeout is rejected.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let url = lookup("LIVY_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_LIVY_URL.to_string());
        let session_kind = lookup("LIVY_SESSION_KIND")
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_KIND.to_string());
        let request_timeout = parse_secs(
            &lookup,
            "LIVY_REQUEST_TIMEOUT_SECS",
            DEFAULT_LIVY_REQUEST_TIMEOUT_SECS,
        )?;
        if request_timeout.is_zero() {
            return Err(CoreError::Validation(
                "LIVY_REQUEST_TIMEOUT_SECS must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            url,
            session_kind,
            request_timeout,
        })
    }
}

impl DatasetConfig {
    pub fn from_env() -> Self {
        Self::from_source(env_source)
    }

    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            data_path: lookup("SALES_DATA_PATH").unwrap_or_else(|| DEFAULT_DATA_PATH.to_string()),
            schema: lookup("SALES_DATA_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
        }
    }
}

impl LifecycleTiming {
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_source(env_source)
    }

    /// Parse the timing knobs, rejecting non-numeric values and zero
    /// poll intervals.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let secs = |key: &str, default: u64| parse_secs(&lookup, key, default);

        let timing = Self {
            ready_poll_interval: secs("SESSION_READY_POLL_SECS", DEFAULT_READY_POLL_SECS)?,
            ready_timeout: secs("SESSION_READY_TIMEOUT_SECS", DEFAULT_READY_TIMEOUT_SECS)?,
            statement_poll_interval: secs("STATEMENT_POLL_SECS", DEFAULT_STATEMENT_POLL_SECS)?,
            statement_timeout: secs("STATEMENT_TIMEOUT_SECS", DEFAULT_STATEMENT_TIMEOUT_SECS)?,
            cleanup_grace: secs("SESSION_CLEANUP_GRACE_SECS", DEFAULT_CLEANUP_GRACE_SECS)?,
        };

        if timing.ready_poll_interval.is_zero() || timing.statement_poll_interval.is_zero() {
            return Err(CoreError::Validation(
                "poll intervals must be at least one second".to_string(),
            ));
        }

        Ok(timing)
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, CoreError> {
    match lookup(key) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
            CoreError::Validation(format!("{key} must be a whole number of seconds, got '{raw}'"))
        }),
    }
}

fn env_source(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
