//! Errors raised by the export store.

use std::io;
use std::path::PathBuf;

use nfs_helper_types::EntryError;
use thiserror::Error;

/// Failures while reading or rewriting the export table.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entry matches the requested path, or the table does not exist.
    #[error("Export not found: {path}")]
    NotFound {
        /// Path that was looked up.
        path: String,
    },
    /// The entry would not survive a rewrite of the table.
    #[error("invalid export entry: {0}")]
    InvalidEntry(#[from] EntryError),
    /// An update tried to rename an entry onto a path held by another entry.
    #[error("export path {path} is already used by another entry")]
    PathConflict {
        /// Target path of the rename.
        path: String,
    },
    /// Acquiring the cross-process lock failed.
    #[error("failed to lock '{path}': {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Reading the table failed.
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing the table failed.
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The table contains a line that cannot be interpreted.
    #[error("failed to parse '{path}' at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl StoreError {
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }
}
