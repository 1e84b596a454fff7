//! Privileged helper daemon for NFS export, quota and session management.
//!
//! The daemon owns `/etc/exports`, the XFS project quota mapping files and
//! the `exportfs`/`xfs_quota` tool invocations on behalf of unprivileged
//! callers. Requests arrive as newline-delimited JSON over a Unix socket
//! whose mode restricts access to root and the socket's group. Each
//! connection carries exactly one request and receives exactly one
//! response.
//!
//! Export table edits are serialised through an advisory lock on a file
//! separate from the table itself and are written atomically, so readers
//! never observe a partially written table. Every successful edit is
//! followed by `exportfs -r`.
//!
//! [`run_daemon`] runs the helper in the foreground until a termination
//! signal arrives; supervision is left to the service manager.

mod bootstrap;
mod command;
mod dispatch;
mod exports;
mod files;
mod lock;
mod process;
mod quota;
mod reload;
mod sessions;
mod telemetry;
mod transport;

pub use process::{LaunchError, ShutdownError, run_daemon};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
