use std::path::PathBuf;

use thiserror::Error;

/// Per-symbol fetch failure. Never fatal: the orchestrator logs it and shows a
/// placeholder for that symbol in the current cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned non-success status {status}")]
    Upstream { status: u16 },

    #[error("upstream returned no data")]
    Empty,

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl FetchError {
    /// Stable label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Upstream { .. } => "upstream",
            FetchError::Empty => "empty",
            FetchError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            FetchError::Upstream {
                status: status.as_u16(),
            }
        } else if error.is_timeout() || error.is_connect() || error.is_request() {
            FetchError::Transport(error.to_string())
        } else {
            FetchError::Unexpected(error.to_string())
        }
    }
}

impl From<tokio::time::error::Elapsed> for FetchError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        FetchError::Transport(format!("request timed out: {error}"))
    }
}

impl From<tokio::task::JoinError> for FetchError {
    fn from(error: tokio::task::JoinError) -> Self {
        FetchError::Unexpected(format!("fetch task failed: {error}"))
    }
}

/// Bad configuration file or flags; aborts before the refresh loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read configuration file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid timeframe '{input}': {reason}")]
    InvalidTimeframe { input: String, reason: String },

    #[error("update interval must be at least 1 second")]
    ZeroInterval,

    #[error("no symbols configured")]
    NoSymbols,
}

/// Terminal surface failure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that terminate a running dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to draw dashboard: {0}")]
    Render(#[from] RenderError),

    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error("failed to build data source: {0}")]
    Source(String),
}
