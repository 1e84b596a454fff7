//! Response envelope written back to clients.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of failure codes reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The request was malformed or carried invalid arguments.
    InvalidArgument,
    /// The referenced export or path does not exist.
    NotFound,
    /// The operation name is not recognised.
    Unsupported,
    /// Any other failure, including failing system tools.
    Internal,
}

impl ErrorCode {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotFound => "NOT_FOUND",
            Self::Unsupported => "UNSUPPORTED",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A single response line.
///
/// Successful responses always carry `result`, which is `null` for
/// operations without a return value. Failures carry `error` and `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Operation result on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Human-readable failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// Identifier echoed from the request, empty when absent.
    #[serde(default)]
    pub request_id: String,
}

impl Response {
    /// Builds a success response.
    pub fn success(result: Value, request_id: impl Into<String>) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
            code: None,
            request_id: request_id.into(),
        }
    }

    /// Builds a failure response.
    pub fn failure(
        code: ErrorCode,
        error: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.into()),
            code: Some(code),
            request_id: request_id.into(),
        }
    }
}
