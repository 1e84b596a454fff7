//! Entry point for the `nfs-helperd` daemon.

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match nfs_helperd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr().lock(), "nfs-helperd: {error}");
            ExitCode::FAILURE
        }
    }
}
