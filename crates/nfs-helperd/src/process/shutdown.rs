//! Termination signals that stop the helper.
//!
//! The helper runs in the foreground under its service manager, so every
//! termination signal, SIGHUP included, removes the socket and exits.

use std::fmt;
use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;

/// Signals that make the helper remove its socket and exit.
const TERMINATION_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Why the helper is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// A termination signal was delivered.
    Signal(i32),
    /// The signal stream closed without delivering a signal.
    Closed,
}

impl fmt::Display for StopCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(SIGTERM) => f.write_str("SIGTERM"),
            Self::Signal(SIGINT) => f.write_str("SIGINT"),
            Self::Signal(SIGQUIT) => f.write_str("SIGQUIT"),
            Self::Signal(SIGHUP) => f.write_str("SIGHUP"),
            Self::Signal(other) => write!(f, "signal {other}"),
            Self::Closed => f.write_str("signal stream closed"),
        }
    }
}

/// Blocks the launch sequence until the helper should stop.
pub trait ShutdownSignal: Send + Sync {
    /// Waits for a stop request and reports its cause.
    fn wait(&self) -> Result<StopCause, ShutdownError>;
}

/// Errors reported while waiting for a stop request.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Registering the termination signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Waits for SIGTERM, SIGINT, SIGQUIT or SIGHUP.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<StopCause, ShutdownError> {
        let mut signals = Signals::new(TERMINATION_SIGNALS)
            .map_err(|source| ShutdownError::Install { source })?;
        Ok(signals
            .forever()
            .next()
            .map_or(StopCause::Closed, StopCause::Signal))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::term(StopCause::Signal(SIGTERM), "SIGTERM")]
    #[case::hup(StopCause::Signal(SIGHUP), "SIGHUP")]
    #[case::other(StopCause::Signal(10), "signal 10")]
    #[case::closed(StopCause::Closed, "signal stream closed")]
    fn names_stop_causes(#[case] cause: StopCause, #[case] expected: &str) {
        assert_eq!(cause.to_string(), expected);
    }
}
