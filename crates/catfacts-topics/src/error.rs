//! Topic error types.

use thiserror::Error;

/// Errors that can occur while building a topic model.
#[derive(Debug, Error)]
pub enum TopicsError {
    /// Topic definitions are inconsistent
    #[error("Invalid topic model: {0}")]
    InvalidModel(String),

    /// Topic not found
    #[error("Topic not found: {0}")]
    NotFound(String),
}
