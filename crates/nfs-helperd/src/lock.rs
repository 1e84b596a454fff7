//! Cross-process exclusion for edits of shared configuration files.
//!
//! The export table and the XFS project mapping files are each rewritten
//! whole, so every read-modify-write cycle runs under a [`FileLock`] on a
//! separate lock file.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use tracing::trace;

const LOCK_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lock");
const LOCK_FILE_MODE: u32 = 0o600;

/// Exclusive advisory lock on a lock file.
///
/// The lock is held for as long as the guard lives and released when it is
/// dropped, on every exit path.
#[derive(Debug)]
pub struct FileLock {
    _lock: Flock<File>,
}

impl FileLock {
    /// Opens (creating if needed) the lock file and blocks until the exclusive
    /// lock is granted.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the lock file or its directory cannot be
    /// created or when `flock` fails for a reason other than interruption.
    pub fn acquire(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .mode(LOCK_FILE_MODE)
            .open(path)?;
        loop {
            match Flock::lock(file, FlockArg::LockExclusive) {
                Ok(lock) => {
                    trace!(target: LOCK_TARGET, path = %path.display(), "file lock acquired");
                    return Ok(Self { _lock: lock });
                }
                Err((returned, Errno::EINTR)) => file = returned,
                Err((_, errno)) => return Err(io::Error::from(errno)),
            }
        }
    }
}
