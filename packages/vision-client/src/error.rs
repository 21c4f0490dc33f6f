//! Error types for the vision client.

use thiserror::Error;

/// Result type for vision client operations.
pub type Result<T> = std::result::Result<T, VisionError>;

/// Vision client errors.
#[derive(Debug, Error)]
pub enum VisionError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, request timed out)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response from the API
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The API answered but the completion carried no text
    #[error("Empty completion")]
    EmptyCompletion,

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl VisionError {
    /// Whether the failure happened before an HTTP status was received.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
