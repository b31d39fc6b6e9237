//! Error types for the mailroom client

use thiserror::Error;

/// Mailroom client error
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure, no usable response
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client could not be constructed
    #[error("Client configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Short kind tag for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Network(_) => "network",
            ClientError::Server { .. } => "server",
            ClientError::NotFound(_) => "not_found",
            ClientError::Json(_) => "decode",
            ClientError::Config(_) => "config",
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
