use std::{fs::OpenOptions, path::Path, sync::Arc};

use crate::shared::error::DashboardError;

/// Initialise logging to `path` (appending).
///
/// The terminal is owned by the live dashboard, so log lines go to a file.
/// Level filtering follows `RUST_LOG`, defaulting to `info`.
pub fn init_logging(path: &Path) -> Result<(), DashboardError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|error| DashboardError::Logging(format!("{}: {error}", path.display())))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .try_init()
        .map_err(|error| DashboardError::Logging(error.to_string()))
}
