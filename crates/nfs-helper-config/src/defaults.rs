//! Built-in defaults matching the paths used by the packaged service.

use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Unix socket the helper listens on.
pub const DEFAULT_SOCKET_PATH: &str = "/run/xinas-nfs-helper.sock";

/// NFS export table managed by the helper.
pub const DEFAULT_EXPORTS_PATH: &str = "/etc/exports";

/// Lock file serialising export table edits across processes.
pub const DEFAULT_LOCK_PATH: &str = "/run/xinas-exports.lock";

/// Lock file serialising edits of the XFS project mapping files.
pub const DEFAULT_QUOTA_LOCK_PATH: &str = "/run/xinas-quota.lock";

/// XFS project id to directory mapping.
pub const DEFAULT_PROJECTS_PATH: &str = "/etc/projects";

/// XFS project name to id mapping.
pub const DEFAULT_PROJID_PATH: &str = "/etc/projid";

/// Root of the kernel's process information filesystem.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Seconds allowed for `exportfs -r` before it is killed.
pub const DEFAULT_RELOAD_TIMEOUT_SECS: u64 = 30;

/// Seconds allowed for each `xfs_quota` invocation before it is killed.
pub const DEFAULT_QUOTA_TIMEOUT_SECS: u64 = 30;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Returns [`DEFAULT_SOCKET_PATH`] as a path.
pub fn default_socket_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_SOCKET_PATH)
}

/// Returns [`DEFAULT_EXPORTS_PATH`] as a path.
pub fn default_exports_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_EXPORTS_PATH)
}

/// Returns [`DEFAULT_LOCK_PATH`] as a path.
pub fn default_lock_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_LOCK_PATH)
}

/// Returns [`DEFAULT_QUOTA_LOCK_PATH`] as a path.
pub fn default_quota_lock_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_QUOTA_LOCK_PATH)
}

/// Returns [`DEFAULT_PROJECTS_PATH`] as a path.
pub fn default_projects_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_PROJECTS_PATH)
}

/// Returns [`DEFAULT_PROJID_PATH`] as a path.
pub fn default_projid_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_PROJID_PATH)
}

/// Returns [`DEFAULT_PROC_ROOT`] as a path.
pub fn default_proc_root() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_PROC_ROOT)
}

/// Returns [`DEFAULT_RELOAD_TIMEOUT_SECS`].
pub const fn default_reload_timeout_secs() -> u64 {
    DEFAULT_RELOAD_TIMEOUT_SECS
}

/// Returns [`DEFAULT_QUOTA_TIMEOUT_SECS`].
pub const fn default_quota_timeout_secs() -> u64 {
    DEFAULT_QUOTA_TIMEOUT_SECS
}

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
