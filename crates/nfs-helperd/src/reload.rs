//! Re-publishing the export table to the running NFS server.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::command::{CommandError, CommandRunner};

const RELOAD_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::reload");
const EXPORTFS: &str = "exportfs";

/// Failures while asking the NFS server to re-read its exports.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("exportfs not found - is nfs-kernel-server installed?")]
    MissingBinary,
    #[error("exportfs -r timed out after {}s", timeout.as_secs())]
    Timeout { timeout: Duration },
    #[error("exportfs -r failed: {stderr}")]
    Failed { stderr: String },
    #[error("failed to run exportfs: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },
}

/// Makes the current export table effective.
pub trait ReloadTrigger: Send + Sync {
    /// Reloads the NFS export table.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError`] when the reload could not be completed.
    fn reload(&self) -> Result<(), ReloadError>;
}

/// Runs `exportfs -r`.
#[derive(Clone)]
pub struct ExportfsReload {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl ExportfsReload {
    /// Builds a trigger that runs `exportfs` through `runner`.
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }
}

impl ReloadTrigger for ExportfsReload {
    fn reload(&self) -> Result<(), ReloadError> {
        let output = self
            .runner
            .run(EXPORTFS, &[String::from("-r")], self.timeout)
            .map_err(|error| match error {
                CommandError::NotFound { .. } => ReloadError::MissingBinary,
                CommandError::Timeout { timeout, .. } => ReloadError::Timeout { timeout },
                CommandError::Io { source, .. } => ReloadError::Spawn { source },
            })?;
        if !output.success() {
            let stderr = output.stderr.trim().to_owned();
            warn!(target: RELOAD_TARGET, status = ?output.status, %stderr, "exportfs -r failed");
            return Err(ReloadError::Failed { stderr });
        }
        info!(target: RELOAD_TARGET, "export table reloaded");
        Ok(())
    }
}
