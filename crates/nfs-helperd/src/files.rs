//! Whole-file replacement for root-owned configuration files.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::Builder;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Mode given to files that do not exist yet.
pub(crate) const DEFAULT_FILE_MODE: u32 = 0o644;

/// Replaces the file at `path` with `contents` in a single rename.
///
/// The payload is written to a temporary file in the same directory, flushed
/// and fsync'd, then renamed over the target so readers observe either the
/// old or the new image, never a partial one. An existing file keeps its
/// permission bits; a new file gets `default_mode`.
pub(crate) fn atomic_write(path: &Path, contents: &[u8], default_mode: u32) -> io::Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "target path did not have a parent directory",
            ));
        }
    };

    let mut builder = Builder::new();
    builder.prefix(
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("nfs-helper"),
    );
    #[cfg(unix)]
    builder.permissions(fs::Permissions::from_mode(existing_mode(path, default_mode)));

    let mut file = builder.tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}

#[cfg(unix)]
fn existing_mode(path: &Path, default_mode: u32) -> u32 {
    fs::metadata(path)
        .map(|metadata| metadata.permissions().mode() & 0o7777)
        .unwrap_or(default_mode)
}
