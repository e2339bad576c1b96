//! Error types for workbench.

use thiserror::Error;

/// Primary error type for all workbench operations.
#[derive(Error, Debug)]
pub enum WorkbenchError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),
}

impl WorkbenchError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether the error came from the model backend rather than local code.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Self::Api { .. }
                | Self::Network(_)
                | Self::Authentication(_)
                | Self::RateLimited { .. }
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, WorkbenchError>;
