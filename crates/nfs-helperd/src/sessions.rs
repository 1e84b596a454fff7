//! NFS client sessions as exposed by the kernel under procfs.

use std::fs;
use std::io;
use std::path::PathBuf;

use nfs_helper_types::{SessionInfo, UNKNOWN_EXPORT_PATH};
use thiserror::Error;
use tracing::debug;

const SESSIONS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::sessions");
const NFSD_CLIENTS_DIR: &str = "fs/nfsd/clients";
const AUTH_UNIX_IP: &str = "net/rpc/auth.unix.ip";
/// Cache class name that prefixes entries in `auth.unix.ip`.
const NFSD_CACHE_CLASS: &str = "nfsd";

/// Failures while enumerating client sessions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads client sessions from a procfs mount.
#[derive(Debug, Clone)]
pub struct SessionSource {
    proc_root: PathBuf,
}

impl SessionSource {
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }

    /// Lists every known client.
    ///
    /// Per-client records under `fs/nfsd/clients` are preferred; when none
    /// exist the export authentication cache is consulted instead.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when a procfs directory or file exists but
    /// cannot be read.
    pub fn list(&self) -> Result<Vec<SessionInfo>, SessionError> {
        let sessions = self.nfsd_clients()?;
        if !sessions.is_empty() {
            return Ok(sessions);
        }
        self.auth_cache_clients()
    }

    /// Lists the sessions that may be using `export_path`.
    ///
    /// # Errors
    ///
    /// See [`SessionSource::list`].
    pub fn for_path(&self, export_path: &str) -> Result<Vec<SessionInfo>, SessionError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|session| session.may_use(export_path))
            .collect())
    }

    fn nfsd_clients(&self) -> Result<Vec<SessionInfo>, SessionError> {
        let dir = self.proc_root.join(NFSD_CLIENTS_DIR);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(SessionError::Read { path: dir, source }),
        };

        let mut info_paths = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path().join("info"))
            .collect::<Vec<_>>();
        info_paths.sort();

        let mut sessions = Vec::with_capacity(info_paths.len());
        for path in info_paths {
            // Clients come and go while we iterate.
            match fs::read_to_string(&path) {
                Ok(text) => sessions.push(parse_client_info(&text)),
                Err(error) => {
                    debug!(
                        target: SESSIONS_TARGET,
                        path = %path.display(),
                        %error,
                        "skipping unreadable client record"
                    );
                }
            }
        }
        Ok(sessions)
    }

    fn auth_cache_clients(&self) -> Result<Vec<SessionInfo>, SessionError> {
        let path = self.proc_root.join(AUTH_UNIX_IP);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(parse_auth_cache(&text)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(SessionError::Read { path, source }),
        }
    }
}

fn parse_client_info(text: &str) -> SessionInfo {
    let mut address = None;
    let mut version = None;
    let mut minor_version = None;
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = unquote(value.trim());
        match key.trim() {
            "address" => address = Some(value.to_owned()),
            "version" => version = Some(value.to_owned()),
            "minor version" => minor_version = Some(value.to_owned()),
            _ => {}
        }
    }

    let client_ip = address
        .as_deref()
        .map_or_else(|| UNKNOWN_EXPORT_PATH.to_owned(), client_ip_of);
    let nfs_version = version
        .or_else(|| minor_version.map(|minor| format!("4.{minor}")))
        .unwrap_or_else(|| UNKNOWN_EXPORT_PATH.to_owned());
    SessionInfo {
        client_ip,
        nfs_version,
        export_path: UNKNOWN_EXPORT_PATH.to_owned(),
        active_locks: 0,
    }
}

/// Strips the trailing `:port` and any IPv6 brackets.
fn client_ip_of(address: &str) -> String {
    let host = match address.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            host
        }
        _ => address,
    };
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .to_owned()
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_auth_cache(text: &str) -> Vec<SessionInfo> {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let first = fields.next()?;
            let ip = if first == NFSD_CACHE_CLASS {
                fields.next().unwrap_or(first)
            } else {
                first
            };
            Some(SessionInfo::unattributed(ip))
        })
        .collect()
}
