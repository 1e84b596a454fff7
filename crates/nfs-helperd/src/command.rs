//! Bounded execution of system utilities.
//!
//! [`SystemCommandRunner`] spawns a program with piped output, polls it until
//! it exits or the time budget is spent, and kills it on timeout. Handlers
//! depend on the [`CommandRunner`] trait so tests can substitute doubles.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

const COMMAND_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::command");
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns whether the command exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Errors raised before a command produced an exit status.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The executable does not exist on `PATH`.
    #[error("{program} not found")]
    NotFound { program: String },
    /// The command outlived its time budget and was killed.
    #[error("{program} timed out after {}s", timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
    /// Spawning or waiting on the process failed.
    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Runs external programs to completion.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args`, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the program is missing, cannot be
    /// spawned or does not finish in time. A non-zero exit is not an error.
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError>;
}

/// [`CommandRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        debug!(target: COMMAND_TARGET, program, ?args, "spawning command");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| spawn_error(program, source))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let status = wait_with_timeout(program, &mut child, timeout)?;

        let output = CommandOutput {
            status: status.code(),
            stdout: collect(stdout),
            stderr: collect(stderr),
        };
        debug!(
            target: COMMAND_TARGET,
            program,
            status = ?output.status,
            "command finished"
        );
        Ok(output)
    }
}

fn spawn_error(program: &str, source: io::Error) -> CommandError {
    if source.kind() == io::ErrorKind::NotFound {
        CommandError::NotFound {
            program: program.to_owned(),
        }
    } else {
        CommandError::Io {
            program: program.to_owned(),
            source,
        }
    }
}

/// Reads a pipe to the end on its own thread so the child never blocks on a
/// full pipe buffer while we poll it.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut reader| {
        thread::spawn(move || {
            let mut bytes = Vec::new();
            drop(reader.read_to_end(&mut bytes));
            String::from_utf8_lossy(&bytes).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn wait_with_timeout(
    program: &str,
    child: &mut Child,
    timeout: Duration,
) -> Result<ExitStatus, CommandError> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if start.elapsed() >= timeout => {
                warn!(
                    target: COMMAND_TARGET,
                    program,
                    timeout_secs = timeout.as_secs(),
                    "command timed out, killing process"
                );
                drop(child.kill());
                drop(child.wait());
                return Err(CommandError::Timeout {
                    program: program.to_owned(),
                    timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                return Err(CommandError::Io {
                    program: program.to_owned(),
                    source,
                });
            }
        }
    }
}
