//! Error types for Whaletown
//!
//! Each parser keeps its own error enum next to it; this enum gathers them
//! for callers that cross module boundaries.

use crate::connection::AddressError;
use crate::mail::ResolveError;
use crate::session::SessionNameError;
use thiserror::Error;

/// Result type alias for Whaletown operations
pub type Result<T> = std::result::Result<T, WhaletownError>;

/// Error type for Whaletown operations
#[derive(Error, Debug)]
pub enum WhaletownError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Address parsing errors
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    /// Session name parsing errors
    #[error("Session name error: {0}")]
    SessionName(#[from] SessionNameError),

    /// Recipient resolution errors
    #[error("Mail error: {0}")]
    Resolve(#[from] ResolveError),

    /// Merge protocol errors
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Workspace layout errors (not in a town, unknown role directory)
    #[error("Workspace error: {0}")]
    Workspace(String),

    /// Other errors
    #[error("{0}")]
    Other(String),

    /// Errors carrying context (file paths for config I/O)
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}
