//! Command runner double for tests that must not touch system tools.

use std::sync::Mutex;
use std::time::Duration;

use crate::command::{CommandError, CommandOutput, CommandRunner};

/// Records every invocation and answers with a fixed outcome.
pub(crate) struct RecordingRunner {
    status: i32,
    stderr: String,
    calls: Mutex<Vec<String>>,
}

impl RecordingRunner {
    /// Runner whose commands all succeed.
    pub(crate) fn succeeding() -> Self {
        Self::with_outcome(0, "")
    }

    /// Runner whose commands all exit with status 1 and `stderr`.
    pub(crate) fn failing(stderr: &str) -> Self {
        Self::with_outcome(1, stderr)
    }

    fn with_outcome(status: i32, stderr: &str) -> Self {
        Self {
            status,
            stderr: stderr.to_owned(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns each recorded call as `program arg1 arg2 ...`.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("runner mutex poisoned").clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        _timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        let mut call = vec![program.to_owned()];
        call.extend(args.iter().cloned());
        self.calls
            .lock()
            .expect("runner mutex poisoned")
            .push(call.join(" "));
        Ok(CommandOutput {
            status: Some(self.status),
            stdout: String::new(),
            stderr: self.stderr.clone(),
        })
    }
}
