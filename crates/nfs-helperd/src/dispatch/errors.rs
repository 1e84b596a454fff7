//! Error types for request dispatch failures.
//!
//! [`DispatchError`] is the single place where failures from the store, the
//! reload trigger and the collaborators are translated into wire codes.

use std::io;

use nfs_helper_types::ErrorCode;
use thiserror::Error;

use crate::exports::StoreError;
use crate::quota::QuotaError;
use crate::reload::ReloadError;
use crate::sessions::SessionError;

/// Errors surfaced during request parsing and dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request line is not a JSON object.
    #[error("Invalid JSON: {message}")]
    MalformedJson { message: String },

    /// A required field is missing or has the wrong type.
    #[error("{message}")]
    InvalidArguments { message: String },

    /// The `op` field names no known operation.
    #[error("Unknown op: {op}")]
    UnknownOperation { op: String },

    /// Request exceeds the maximum allowed size.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge { size: usize, max_size: usize },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Reload(#[from] ReloadError),

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    Sessions(#[from] SessionError),

    /// Result serialization failed.
    #[error("failed to serialize result: {0}")]
    SerializeResult(#[source] serde_json::Error),

    /// IO error while reading the request.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl DispatchError {
    /// Returns the wire code reported for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedJson { .. }
            | Self::InvalidArguments { .. }
            | Self::RequestTooLarge { .. } => ErrorCode::InvalidArgument,
            Self::UnknownOperation { .. } => ErrorCode::Unsupported,
            Self::Store(StoreError::NotFound { .. })
            | Self::Quota(QuotaError::PathNotFound { .. }) => ErrorCode::NotFound,
            Self::Store(StoreError::InvalidEntry(_) | StoreError::PathConflict { .. })
            | Self::Quota(
                QuotaError::InvertedLimits { .. } | QuotaError::ProjectIdOutOfRange { .. },
            ) => ErrorCode::InvalidArgument,
            Self::Store(_)
            | Self::Reload(_)
            | Self::Quota(_)
            | Self::Sessions(_)
            | Self::SerializeResult(_)
            | Self::Io(_) => ErrorCode::Internal,
        }
    }

    /// Creates a malformed JSON error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedJson {
            message: message.into(),
        }
    }

    /// Creates an invalid arguments error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }

    /// Creates an unknown operation error.
    pub fn unknown_operation(op: impl Into<String>) -> Self {
        Self::UnknownOperation { op: op.into() }
    }

    /// Creates a request too large error.
    pub fn request_too_large(size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { size, max_size }
    }
}
