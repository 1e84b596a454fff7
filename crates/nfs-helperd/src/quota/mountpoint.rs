//! Mount point discovery by device id.

use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

/// Returns the mount point of the filesystem holding `path`.
///
/// `path` is resolved to its canonical form and then walked upwards until
/// the parent lives on a different device or the root is reached.
pub(crate) fn find_mountpoint(path: &Path) -> io::Result<PathBuf> {
    let mut current = fs::canonicalize(path)?;
    let device = fs::metadata(&current)?.dev();
    loop {
        let Some(parent) = current.parent() else {
            return Ok(current);
        };
        if fs::metadata(parent)?.dev() != device {
            return Ok(current);
        }
        current = parent.to_path_buf();
    }
}
