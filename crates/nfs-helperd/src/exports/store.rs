//! Lock-guarded read-modify-write access to the export table.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use nfs_helper_config::Config;
use nfs_helper_types::{ExportEntry, ExportPatch};
use tracing::debug;

use super::STORE_TARGET;
use super::errors::StoreError;
use super::format::{parse_exports, serialize_exports};
use crate::files::{DEFAULT_FILE_MODE, atomic_write};
use crate::lock::FileLock;

/// Reads and rewrites the NFS export table.
///
/// Every operation holds the export lock for its whole read-modify-write span
/// and re-reads the file, so no state is cached between calls.
#[derive(Debug, Clone)]
pub struct ExportStore {
    exports_path: PathBuf,
    lock_path: PathBuf,
}

impl ExportStore {
    /// Builds a store over the paths named in `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_paths(
            config.exports_path().as_std_path(),
            config.lock_path().as_std_path(),
        )
    }

    /// Builds a store over explicit table and lock file paths.
    pub fn with_paths(exports_path: impl Into<PathBuf>, lock_path: impl Into<PathBuf>) -> Self {
        Self {
            exports_path: exports_path.into(),
            lock_path: lock_path.into(),
        }
    }

    /// Path of the managed export table.
    #[must_use]
    pub fn exports_path(&self) -> &Path {
        &self.exports_path
    }

    /// Returns every entry in file order. A missing table is empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lock, the read or the parse fails.
    pub fn list(&self) -> Result<Vec<ExportEntry>, StoreError> {
        let _lock = self.lock()?;
        Ok(self.read()?.unwrap_or_default())
    }

    /// Inserts `entry`, replacing any entry with the same path and moving it
    /// to the end of the table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidEntry`] before touching the table when the
    /// entry cannot be represented, or an I/O flavoured [`StoreError`].
    pub fn add(&self, entry: ExportEntry) -> Result<(), StoreError> {
        entry.validate()?;
        let _lock = self.lock()?;
        let mut entries = self.read()?.unwrap_or_default();
        let before = entries.len();
        entries.retain(|existing| existing.path != entry.path);
        debug!(
            target: STORE_TARGET,
            path = %entry.path,
            replaced = before != entries.len(),
            "adding export"
        );
        entries.push(entry);
        self.write(&entries)
    }

    /// Removes the entry whose path equals `path` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the table is missing or holds no
    /// such entry.
    pub fn remove(&self, path: &str) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        let mut entries = self
            .read()?
            .ok_or_else(|| StoreError::not_found(path))?;
        let before = entries.len();
        entries.retain(|entry| entry.path != path);
        if entries.len() == before {
            return Err(StoreError::not_found(path));
        }
        debug!(target: STORE_TARGET, path, "removing export");
        self.write(&entries)
    }

    /// Applies `patch` to the entry whose path equals `path`, keeping its
    /// position in the table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] under the same conditions as
    /// [`ExportStore::remove`], [`StoreError::InvalidEntry`] when the patched
    /// entry cannot be represented and [`StoreError::PathConflict`] when the
    /// patch renames the entry onto another entry's path.
    pub fn update(&self, path: &str, patch: ExportPatch) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        let mut entries = self
            .read()?
            .ok_or_else(|| StoreError::not_found(path))?;
        let index = entries
            .iter()
            .position(|entry| entry.path == path)
            .ok_or_else(|| StoreError::not_found(path))?;

        let mut patched = entries
            .get(index)
            .cloned()
            .ok_or_else(|| StoreError::not_found(path))?;
        patched.apply(patch);
        patched.validate()?;
        let conflict = entries
            .iter()
            .enumerate()
            .any(|(other, entry)| other != index && entry.path == patched.path);
        if conflict {
            return Err(StoreError::PathConflict {
                path: patched.path,
            });
        }

        debug!(target: STORE_TARGET, path, new_path = %patched.path, "updating export");
        if let Some(slot) = entries.get_mut(index) {
            *slot = patched;
        }
        self.write(&entries)
    }

    fn lock(&self) -> Result<FileLock, StoreError> {
        FileLock::acquire(&self.lock_path).map_err(|source| StoreError::Lock {
            path: self.lock_path.clone(),
            source,
        })
    }

    fn read(&self) -> Result<Option<Vec<ExportEntry>>, StoreError> {
        let text = match fs::read_to_string(&self.exports_path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.exports_path.clone(),
                    source,
                });
            }
        };
        parse_exports(&text)
            .map(Some)
            .map_err(|error| StoreError::Parse {
                path: self.exports_path.clone(),
                line: error.line,
                message: error.message,
            })
    }

    fn write(&self, entries: &[ExportEntry]) -> Result<(), StoreError> {
        let text = serialize_exports(entries);
        atomic_write(&self.exports_path, text.as_bytes(), DEFAULT_FILE_MODE).map_err(|source| {
            StoreError::Write {
                path: self.exports_path.clone(),
                source,
            }
        })
    }
}
