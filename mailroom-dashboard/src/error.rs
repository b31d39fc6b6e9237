//! Error types for the dashboard

use thiserror::Error;

use crate::query::ValidationError;

/// Dashboard error
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Malformed query parameters
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Read API failure
    #[error("Gateway error: {0}")]
    Gateway(#[from] mailroom_client::ClientError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// No usable list could be fetched
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
