//! Command-line definitions for the `nfs-helper` client.
//!
//! The build script includes this file to render the manual page, so it
//! holds argument definitions only.

use clap::{Parser, Subcommand};

/// Sends one request to the privileged NFS helper daemon and prints its
/// response line.
///
/// Leading `--socket PATH` and `--config-path PATH` flags select the daemon
/// socket; `NFS_HELPER_SOCKET` is honoured as well.
#[derive(Parser, Debug)]
#[command(name = "nfs-helper", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Identifier echoed back in the response.
    #[arg(long, value_name = "ID", global = true)]
    pub(crate) request_id: Option<String>,
    /// Operation to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Operations understood by the helper daemon.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Lists every export in table order.
    List,
    /// Adds an export, replacing any export with the same path.
    Add {
        /// Exported directory.
        path: String,
        /// Permitted clients as `host(opt,opt)` or `host`.
        #[arg(value_name = "CLIENT", required = true)]
        clients: Vec<String>,
    },
    /// Removes the export with the given path.
    Remove {
        /// Exported directory.
        path: String,
    },
    /// Changes an existing export in place.
    Update {
        /// Exported directory.
        path: String,
        /// Replacement path.
        #[arg(long, value_name = "PATH")]
        new_path: Option<String>,
        /// Replacement client; repeat to list several.
        #[arg(long = "client", value_name = "CLIENT")]
        clients: Vec<String>,
    },
    /// Lists NFS client sessions.
    Sessions {
        /// Restricts the listing to sessions that may use this export.
        #[arg(long, value_name = "PATH")]
        path: Option<String>,
    },
    /// Sets an XFS project quota on a directory.
    Quota {
        /// Directory to limit.
        path: String,
        /// Soft block limit in KiB.
        #[arg(long = "soft", value_name = "KB")]
        soft_limit_kb: u64,
        /// Hard block limit in KiB; zero disables it.
        #[arg(long = "hard", value_name = "KB")]
        hard_limit_kb: u64,
        /// Explicit XFS project id; derived from the path when omitted.
        #[arg(long, value_name = "N")]
        project_id: Option<u32>,
    },
    /// Re-exports the table with `exportfs -r`.
    Reload,
}
