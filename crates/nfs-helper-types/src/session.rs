//! Active NFS client sessions.

use serde::{Deserialize, Serialize};

/// Placeholder used when the kernel does not attribute a value.
pub const UNKNOWN_EXPORT_PATH: &str = "unknown";

/// One client currently known to the NFS server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Client address without port.
    pub client_ip: String,
    /// Negotiated protocol version, or `"unknown"`.
    pub nfs_version: String,
    /// Export the client is using, or `"unknown"` when the kernel does not
    /// attribute clients to exports.
    pub export_path: String,
    /// Locks held by the client. Always zero; the kernel does not expose it
    /// per client.
    pub active_locks: u32,
}

impl SessionInfo {
    /// Builds a session whose version and export are not attributed.
    pub fn unattributed(client_ip: impl Into<String>) -> Self {
        Self {
            client_ip: client_ip.into(),
            nfs_version: UNKNOWN_EXPORT_PATH.to_owned(),
            export_path: UNKNOWN_EXPORT_PATH.to_owned(),
            active_locks: 0,
        }
    }

    /// Returns true when this session may be using `export_path`.
    ///
    /// Sessions without export attribution match every path.
    #[must_use]
    pub fn may_use(&self, export_path: &str) -> bool {
        self.export_path == export_path || self.export_path == UNKNOWN_EXPORT_PATH
    }
}
