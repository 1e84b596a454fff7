//! Process lifecycle: configuration, listener startup and signal-driven
//! shutdown.

mod errors;
mod launch;
mod shutdown;

pub use errors::LaunchError;
pub use launch::run_daemon;
#[cfg(test)]
pub(crate) use launch::{LaunchPlan, run_daemon_with};
pub use shutdown::ShutdownError;
#[cfg(test)]
pub(crate) use shutdown::{ShutdownSignal, StopCause};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
