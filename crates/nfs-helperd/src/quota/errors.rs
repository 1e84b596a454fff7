//! Errors raised while applying project quotas.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::command::CommandError;

/// Failures while assigning an XFS project quota.
#[derive(Debug, Error)]
pub enum QuotaError {
    /// The directory to limit does not exist.
    #[error("path not found: {path}")]
    PathNotFound { path: String },
    /// The hard limit is below the soft limit.
    #[error("hard_limit_kb ({hard}) must not be below soft_limit_kb ({soft})")]
    InvertedLimits { soft: u64, hard: u64 },
    /// The requested project id is outside the usable range.
    #[error("project_id must be between 1 and {max}, got {id}")]
    ProjectIdOutOfRange { id: u32, max: u32 },
    /// Inspecting the directory or its ancestors failed.
    #[error("failed to inspect '{path}': {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Acquiring the mapping file lock failed.
    #[error("failed to lock '{path}': {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Rewriting a project mapping file failed.
    #[error("failed to update '{path}': {source}")]
    MappingFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// `xfs_quota` could not be run.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// `xfs_quota` exited unsuccessfully.
    #[error("xfs_quota -c '{command}' failed: {stderr}")]
    ToolFailed { command: String, stderr: String },
}
