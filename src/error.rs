//! Unified error type for pixyproxy.
//!
//! Every variant is one error kind. [`ImageError::status_code`] maps each kind
//! to the HTTP status the API answers with, and the [`IntoResponse`] impl
//! renders the `{ "detail", "stack_trace" }` body.

use std::error::Error as _;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors that can occur while serving image requests.
#[derive(Debug, Error)]
pub enum ImageError {
    /// No pooled database connection could be obtained.
    #[error("A connection to the database could not be established: {0}")]
    Connection(String),

    /// The database driver reported a failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No image record exists for the requested GUID.
    #[error("The requested record was not found: {0}")]
    NotFound(String),

    /// The record exists but its image file is missing on disk.
    #[error("The requested image was not found: {0}")]
    ImageNotFound(String),

    /// An insert violated a uniqueness or shape constraint.
    #[error("A database constraint was violated: {0}")]
    ConstraintViolation(String),

    /// Input failed validation, or a lookup could not be satisfied.
    #[error("{0}")]
    DataValidation(String),

    /// A bulk operation could not be carried out.
    #[error("{0}")]
    InvalidOperation(String),

    /// The request could not be understood.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No route matches the request path.
    #[error("Endpoint not found: {0}")]
    EndpointNotFound(String),

    /// The image generation provider returned an error response.
    #[error("Generation API error ({status}): {message}")]
    Generation {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Error message or body from the provider.
        message: String,
    },

    /// A network error occurred while talking to the provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Reading or writing an image file failed.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The provider payload could not be decoded or normalized to PNG.
    #[error("Image conversion error: {0}")]
    ImageConversion(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// A broken internal invariant.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ImageError {
    /// HTTP status for this error kind.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::ImageNotFound(_) | Self::EndpointNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::ConstraintViolation(_) => StatusCode::CONFLICT,
            Self::DataValidation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidOperation(_) => StatusCode::FORBIDDEN,
            Self::Connection(_)
            | Self::Database(_)
            | Self::Generation { .. }
            | Self::Network(_)
            | Self::Storage(_)
            | Self::ImageConversion(_)
            | Self::Config(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render this error and every source beneath it, outermost first.
    #[must_use]
    pub fn chain(&self) -> String {
        let mut lines = vec![format!("{self:?}")];
        let mut source = self.source();
        while let Some(cause) = source {
            lines.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        lines.join("\n")
    }
}

impl IntoResponse for ImageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        let body = json!({ "detail": self.to_string(), "stack_trace": self.chain() });
        (status, Json(body)).into_response()
    }
}
