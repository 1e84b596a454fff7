//! Shared fixtures for the daemon behaviour suites.

mod config_loader;
mod runner;

use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::bootstrap::build_handler;
use crate::command::CommandRunner;
use crate::transport::{ListenerHandle, SocketListener};

pub(crate) use config_loader::TestConfigLoader;
pub(crate) use runner::RecordingRunner;

const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Binds the configured socket and serves it with the production handler.
pub(crate) fn start_helper(
    loader: &TestConfigLoader,
    runner: Arc<dyn CommandRunner>,
) -> Result<ListenerHandle, String> {
    let config = loader.config();
    config
        .prepare_socket_directory()
        .map_err(|error| error.to_string())?;
    let handler = Arc::new(build_handler(&config, runner));
    let listener =
        SocketListener::bind(config.socket().as_std_path()).map_err(|error| error.to_string())?;
    listener.start(handler).map_err(|error| error.to_string())
}

/// Writes `payload`, half-closes the connection and returns everything the
/// helper sent back.
pub(crate) fn exchange(socket: &Path, payload: &[u8]) -> Result<String, String> {
    let mut stream = UnixStream::connect(socket).map_err(|error| error.to_string())?;
    stream
        .set_read_timeout(Some(READ_TIMEOUT))
        .map_err(|error| error.to_string())?;
    stream
        .write_all(payload)
        .map_err(|error| error.to_string())?;
    stream
        .shutdown(Shutdown::Write)
        .map_err(|error| error.to_string())?;
    let mut reply = String::new();
    stream
        .read_to_string(&mut reply)
        .map_err(|error| error.to_string())?;
    Ok(reply)
}

/// Sends a single request line and returns the response without its
/// trailing newline.
pub(crate) fn request(socket: &Path, line: &str) -> Result<String, String> {
    let reply = exchange(socket, format!("{line}\n").as_bytes())?;
    Ok(reply.trim_end_matches('\n').to_owned())
}

/// Strips surrounding double quotes from a step argument.
pub(crate) fn strip_quotes(value: &str) -> &str {
    value.trim_matches('"')
}
