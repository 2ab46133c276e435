//! Error types for Channelsheet core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Result of a single YouTube Data API call attempt.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors that can occur in Channelsheet core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// YouTube Data API call failed.
    #[error("YouTube API error: {0}")]
    Api(#[from] ApiError),

    /// Sheet read or write failed.
    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures produced by a single YouTube Data API call attempt.
///
/// `QuotaExceeded` is consumed by the executor's rotation loop and never
/// reaches callers of [`crate::executor::ApiExecutor::execute`]. `NotFound`
/// is handled at the resolution and aggregation layers; the remaining
/// variants always propagate.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The active API key has exhausted its daily quota.
    #[error("quota exceeded for the active API key")]
    QuotaExceeded,

    /// The requested resource does not exist.
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource.
        resource: String,
    },

    /// The API answered with a non-success status outside the quota
    /// and not-found classes.
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the API, or the raw body.
        message: String,
    },

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Creates a transport error from anything displayable.
    pub fn transport(message: impl std::fmt::Display) -> Self {
        Self::Transport(message.to_string())
    }

    /// Creates a not-found error for the given resource.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Returns true for the quota-exhaustion variant.
    #[must_use]
    pub const fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded)
    }

    /// Returns true for the not-found variant.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failures produced by the tabular sheet backend.
#[derive(Debug, Error)]
pub enum SheetError {
    /// The sheet file could not be read.
    #[error("failed to read sheet {path}: {reason}")]
    Read {
        /// Path of the sheet file.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// The sheet file could not be written.
    #[error("failed to write sheet {path}: {reason}")]
    Write {
        /// Path of the sheet file.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// A cell address used row or column zero.
    #[error("invalid cell address row {row}, column {column}: addresses are 1-based")]
    InvalidAddress {
        /// Requested row.
        row: usize,
        /// Requested column.
        column: usize,
    },
}
