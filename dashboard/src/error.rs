//! Errors raised while loading and operating the dashboard.

use hierarchy::RoleError;

/// Error types for the dashboard layer.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Input records are malformed or break a data invariant
    #[error("Schema error: {0}")]
    Schema(String),

    /// A role tree operation was refused
    #[error(transparent)]
    Role(#[from] RoleError),

    /// Configuration could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Reading a data or config file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub(crate) fn schema(context: &str, detail: impl std::fmt::Display) -> Self {
        Self::Schema(format!("{}: {}", context, detail))
    }
}

/// Result type for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;
