//! API and startup error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tabula_engine::{CacheError, SourceError};

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub detail: String,
    /// Error code for programmatic handling
    pub code: &'static str,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    EmptyOrMalformed(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("Source is not allowed: {0}")]
    BlockedSource(String),

    #[error("{0}")]
    DownloadFailed(String),

    #[error("{0}")]
    LockTimeout(String),

    #[error("{0}")]
    Io(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::EmptyOrMalformed(_) => "empty_or_malformed",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::BlockedSource(_) => "blocked_source",
            Self::DownloadFailed(_) => "download_failed",
            Self::LockTimeout(_) => "lock_timeout",
            Self::Io(_) => "io_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::EmptyOrMalformed(_)
            | Self::InvalidArgument(_)
            | Self::InvalidOperation(_)
            | Self::BlockedSource(_) => StatusCode::BAD_REQUEST,
            Self::DownloadFailed(_) => StatusCode::BAD_GATEWAY,
            Self::LockTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        let detail = err.to_string();
        match err {
            SourceError::NotFound(_) => Self::NotFound(detail),
            SourceError::EmptyOrMalformed(_) => Self::EmptyOrMalformed(detail),
            SourceError::InvalidArgument(_) => Self::InvalidArgument(detail),
            SourceError::InvalidOperation(_) => Self::InvalidOperation(detail),
            SourceError::Cache(CacheError::Download(_)) => Self::DownloadFailed(detail),
            SourceError::Cache(CacheError::LockTimeout { .. }) => Self::LockTimeout(detail),
            SourceError::Cache(CacheError::Lock(_) | CacheError::Io(_)) | SourceError::Io(_) => {
                Self::Io(detail)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "Request rejected");
        }

        let body = ErrorResponse {
            code: self.code(),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors that stop the server from starting
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Initialization failed: {0}")]
    Initialization(String),
}
