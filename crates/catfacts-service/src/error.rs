//! Service error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use catfacts_storage::StorageError;

/// Errors surfaced by the access layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request body is missing or has the wrong shape
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Store operation failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Blocking store task was cancelled or panicked
    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Listener could not be bound or the server failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Storage(_) | ServiceError::Task(_) | ServiceError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
