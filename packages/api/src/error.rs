//! API error types
//!
//! Errors are answered with a plain-text body, like the rest of the API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use list_core::{StoreError, ValidationError};
use realtime::RegistryError;
use thiserror::Error;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// The `item` form field was absent or empty
    #[error("Item not provided")]
    ItemNotProvided,

    /// The item text was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The stream could not be registered
    #[error("Failed to open stream: {0}")]
    Stream(#[from] RegistryError),

    /// Storage failed
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ItemNotProvided => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Stream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(e) => Self::Validation(e),
            StoreError::Backend(msg) => Self::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error_message = %message, status = %status, "API error");
        } else {
            tracing::warn!(error_message = %message, status = %status, "API error");
        }

        (status, message).into_response()
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
