//! Shared configuration for the NFS helper daemon and its client.
//!
//! The [`Config`] value is resolved once at process start from built-in
//! defaults, an optional configuration file, `NFS_HELPER_*` environment
//! variables and command-line flags (in increasing order of precedence), and
//! is then passed explicitly to every component that needs a path or a
//! timeout. Nothing in the helper reads paths from ambient globals.

mod defaults;
mod logging;
mod socket;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_EXPORTS_PATH, DEFAULT_LOCK_PATH, DEFAULT_LOG_FILTER, DEFAULT_PROC_ROOT,
    DEFAULT_PROJECTS_PATH, DEFAULT_PROJID_PATH, DEFAULT_QUOTA_LOCK_PATH,
    DEFAULT_QUOTA_TIMEOUT_SECS, DEFAULT_RELOAD_TIMEOUT_SECS, DEFAULT_SOCKET_PATH,
    default_exports_path, default_lock_path, default_log_filter, default_log_filter_string,
    default_log_format, default_proc_root, default_projects_path, default_projid_path,
    default_quota_lock_path, default_quota_timeout_secs, default_reload_timeout_secs,
    default_socket_path,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketPreparationError, prepare_socket_directory};

/// Runtime configuration for the helper.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "NFS_HELPER")]
pub struct Config {
    /// Unix socket the daemon listens on and the client connects to.
    #[serde(default = "default_socket_path")]
    pub socket: Utf8PathBuf,
    /// NFS export table rewritten by the daemon.
    #[serde(default = "default_exports_path")]
    pub exports_path: Utf8PathBuf,
    /// Lock file guarding export table edits.
    #[serde(default = "default_lock_path")]
    pub lock_path: Utf8PathBuf,
    /// Lock file guarding edits of the XFS project mapping files.
    #[serde(default = "default_quota_lock_path")]
    pub quota_lock_path: Utf8PathBuf,
    /// XFS project id to directory mapping file.
    #[serde(default = "default_projects_path")]
    pub projects_path: Utf8PathBuf,
    /// XFS project name to id mapping file.
    #[serde(default = "default_projid_path")]
    pub projid_path: Utf8PathBuf,
    /// Mount point of procfs, consulted for NFS client sessions.
    #[serde(default = "default_proc_root")]
    pub proc_root: Utf8PathBuf,
    /// Time budget for `exportfs -r`.
    #[serde(default = "default_reload_timeout_secs")]
    pub reload_timeout_secs: u64,
    /// Time budget for each `xfs_quota` call.
    #[serde(default = "default_quota_timeout_secs")]
    pub quota_timeout_secs: u64,
    /// `tracing` filter expression.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket: default_socket_path(),
            exports_path: default_exports_path(),
            lock_path: default_lock_path(),
            quota_lock_path: default_quota_lock_path(),
            projects_path: default_projects_path(),
            projid_path: default_projid_path(),
            proc_root: default_proc_root(),
            reload_timeout_secs: default_reload_timeout_secs(),
            quota_timeout_secs: default_quota_timeout_secs(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Returns the daemon socket path.
    #[must_use]
    pub fn socket(&self) -> &Utf8Path {
        &self.socket
    }

    /// Returns the export table path.
    #[must_use]
    pub fn exports_path(&self) -> &Utf8Path {
        &self.exports_path
    }

    /// Returns the export lock file path.
    #[must_use]
    pub fn lock_path(&self) -> &Utf8Path {
        &self.lock_path
    }

    /// Returns the lock file path guarding the XFS mapping files.
    #[must_use]
    pub fn quota_lock_path(&self) -> &Utf8Path {
        &self.quota_lock_path
    }

    /// Returns the XFS `projects` mapping file path.
    #[must_use]
    pub fn projects_path(&self) -> &Utf8Path {
        &self.projects_path
    }

    /// Returns the XFS `projid` mapping file path.
    #[must_use]
    pub fn projid_path(&self) -> &Utf8Path {
        &self.projid_path
    }

    /// Returns the procfs mount point.
    #[must_use]
    pub fn proc_root(&self) -> &Utf8Path {
        &self.proc_root
    }

    /// Returns the reload timeout as a [`Duration`].
    #[must_use]
    pub fn reload_timeout(&self) -> Duration {
        Duration::from_secs(self.reload_timeout_secs)
    }

    /// Returns the quota tool timeout as a [`Duration`].
    #[must_use]
    pub fn quota_timeout(&self) -> Duration {
        Duration::from_secs(self.quota_timeout_secs)
    }

    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the configured log format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Ensures the socket's parent directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`SocketPreparationError`] when the directory cannot be created.
    pub fn prepare_socket_directory(&self) -> Result<(), SocketPreparationError> {
        prepare_socket_directory(&self.socket)
    }
}
