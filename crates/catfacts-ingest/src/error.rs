//! Fact source error types.

use thiserror::Error;

/// Errors raised while fetching or building.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Request could not be sent or timed out
    #[error("Request failed: {0}")]
    Request(String),

    /// Endpoint answered with a non-success status
    #[error("Endpoint returned status {status}: {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// Response body was not the expected JSON shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid source configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Persisting the build failed
    #[error("Storage error: {0}")]
    Storage(#[from] catfacts_storage::StorageError),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SourceError::Status {
                endpoint: err.url().map(|u| u.to_string()).unwrap_or_default(),
                status: status.as_u16(),
            },
            None => SourceError::Request(err.to_string()),
        }
    }
}

impl SourceError {
    /// Whether a retry might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Request(_) => true,
            SourceError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
