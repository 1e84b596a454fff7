//! Request decoding for the dispatch loop.
//!
//! A request line is a JSON object with a string `op`, an optional string
//! `request_id` and operation-specific fields. Decoding happens in two steps:
//! [`RequestEnvelope::parse`] extracts the operation and request id, then
//! [`Request::decode`] turns the remaining fields into typed arguments.

use std::str::FromStr;

use nfs_helper_types::{ExportEntry, ExportPatch, QuotaSpec};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use strum::{EnumString, IntoStaticStr};

use super::errors::DispatchError;
use crate::quota::QuotaRequest;

/// Operations understood by the helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    ListExports,
    AddExport,
    RemoveExport,
    UpdateExport,
    ListSessions,
    GetSessions,
    SetQuota,
    Reload,
}

impl Operation {
    /// Returns the wire name of the operation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Fields shared by every request.
#[derive(Debug)]
pub struct RequestEnvelope {
    pub request_id: String,
    pub operation: Operation,
    fields: Map<String, Value>,
}

/// Outcome of reading the envelope of a request line.
///
/// A failure still carries the request id when the line was a JSON object,
/// so the error response can echo it.
#[derive(Debug)]
pub struct EnvelopeError {
    pub request_id: String,
    pub error: DispatchError,
}

impl RequestEnvelope {
    /// Parses a request line.
    ///
    /// Trailing whitespace, including a carriage return, is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError`] when the line is not a JSON object, when `op`
    /// is missing or not a string, or when `op` names no known operation.
    pub fn parse(line: &[u8]) -> Result<Self, EnvelopeError> {
        let trimmed = line.trim_ascii_end();
        let value: Value = serde_json::from_slice(trimmed).map_err(|error| EnvelopeError {
            request_id: String::new(),
            error: DispatchError::malformed(error.to_string()),
        })?;
        let Value::Object(fields) = value else {
            return Err(EnvelopeError {
                request_id: String::new(),
                error: DispatchError::malformed("request must be a JSON object"),
            });
        };

        let request_id = match fields.get("request_id") {
            Some(Value::String(id)) => id.clone(),
            _ => String::new(),
        };
        let fail = |error| EnvelopeError {
            request_id: request_id.clone(),
            error,
        };

        let op = match fields.get("op") {
            Some(Value::String(op)) if !op.is_empty() => op,
            _ => return Err(fail(DispatchError::invalid_arguments("Missing 'op' field"))),
        };
        let operation =
            Operation::from_str(op).map_err(|_| fail(DispatchError::unknown_operation(op)))?;

        Ok(Self {
            request_id,
            operation,
            fields,
        })
    }

    /// Decodes the operation-specific fields.
    ///
    /// # Errors
    ///
    /// See [`Request::decode`].
    pub fn into_request(self) -> Result<Request, DispatchError> {
        Request::decode(self.operation, &self.fields)
    }
}

/// A request with typed arguments, one variant per [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListExports,
    AddExport { entry: ExportEntry },
    RemoveExport { path: String },
    UpdateExport { path: String, patch: ExportPatch },
    ListSessions,
    GetSessions { path: String },
    SetQuota(QuotaRequest),
    Reload,
}

impl Request {
    /// Decodes the fields required by `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidArguments`] when a required field is
    /// missing or malformed, and [`DispatchError::Quota`] when quota limits
    /// are inconsistent.
    pub fn decode(operation: Operation, fields: &Map<String, Value>) -> Result<Self, DispatchError> {
        Ok(match operation {
            Operation::ListExports => Self::ListExports,
            Operation::ListSessions => Self::ListSessions,
            Operation::Reload => Self::Reload,
            Operation::AddExport => Self::AddExport {
                entry: decode_entry(fields)?,
            },
            Operation::RemoveExport => Self::RemoveExport {
                path: required_path(fields)?,
            },
            Operation::UpdateExport => {
                let path = required_path(fields)?;
                let patch = match fields.get("patch") {
                    None | Some(Value::Null) => {
                        return Err(DispatchError::invalid_arguments("Missing 'patch' field"));
                    }
                    Some(value) => decode_value::<ExportPatch>(value, "patch")?,
                };
                Self::UpdateExport { path, patch }
            }
            Operation::GetSessions => Self::GetSessions {
                path: required_path(fields)?,
            },
            Operation::SetQuota => Self::SetQuota(decode_quota(fields)?),
        })
    }

    /// Returns the operation this request carries out.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::ListExports => Operation::ListExports,
            Self::AddExport { .. } => Operation::AddExport,
            Self::RemoveExport { .. } => Operation::RemoveExport,
            Self::UpdateExport { .. } => Operation::UpdateExport,
            Self::ListSessions => Operation::ListSessions,
            Self::GetSessions { .. } => Operation::GetSessions,
            Self::SetQuota(_) => Operation::SetQuota,
            Self::Reload => Operation::Reload,
        }
    }
}

fn non_empty_object<'a>(
    fields: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Value, DispatchError> {
    match fields.get(key) {
        Some(value @ Value::Object(object)) if !object.is_empty() => Ok(value),
        _ => Err(DispatchError::invalid_arguments(format!(
            "Missing or invalid '{key}' field"
        ))),
    }
}

fn required_path(fields: &Map<String, Value>) -> Result<String, DispatchError> {
    match fields.get("path") {
        Some(Value::String(path)) if !path.is_empty() => Ok(path.clone()),
        _ => Err(DispatchError::invalid_arguments("Missing 'path' field")),
    }
}

fn decode_value<T: DeserializeOwned>(value: &Value, field: &str) -> Result<T, DispatchError> {
    T::deserialize(value)
        .map_err(|error| DispatchError::invalid_arguments(format!("invalid '{field}': {error}")))
}

fn decode_entry(fields: &Map<String, Value>) -> Result<ExportEntry, DispatchError> {
    let entry = non_empty_object(fields, "entry")?;
    if entry.get("path").is_none() {
        return Err(DispatchError::invalid_arguments("entry.path is required"));
    }
    decode_value(entry, "entry")
}

fn decode_quota(fields: &Map<String, Value>) -> Result<QuotaRequest, DispatchError> {
    let quota = non_empty_object(fields, "quota")?;
    let spec: QuotaSpec = decode_value(quota, "quota")?;
    let path = spec
        .path
        .filter(|path| !path.is_empty())
        .or_else(|| match fields.get("path") {
            Some(Value::String(path)) if !path.is_empty() => Some(path.clone()),
            _ => None,
        })
        .ok_or_else(|| DispatchError::invalid_arguments("quota.path is required"))?;
    Ok(QuotaRequest::new(
        path,
        spec.soft_limit_kb,
        spec.hard_limit_kb,
        spec.project_id,
    )?)
}
