//! Connection handler that dispatches one JSONL request per connection.

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;

use tracing::{debug, warn};

use crate::transport::ConnectionHandler;

use super::dispatcher::RequestDispatcher;
use super::errors::DispatchError;
use super::response::ResponseWriter;
use super::router::DISPATCH_TARGET;

/// Maximum size of a single request line in bytes.
pub(crate) const MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Connection handler that reads one request line and writes one response.
#[derive(Clone)]
pub struct DispatchConnectionHandler {
    dispatcher: RequestDispatcher,
}

impl DispatchConnectionHandler {
    pub fn new(dispatcher: RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Serves a single request over `stream`.
    ///
    /// Only the bytes before the first newline are dispatched. A peer that
    /// closes before sending a newline gets no response.
    pub fn serve<S: Read + Write>(&self, stream: &mut S) {
        let response = match read_request_line(stream) {
            Ok(Some(line)) => self.dispatcher.dispatch_line(&line),
            Ok(None) => {
                debug!(target: DISPATCH_TARGET, "client disconnected without request");
                return;
            }
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "failed to read request");
                if !matches!(error, DispatchError::RequestTooLarge { .. }) {
                    return;
                }
                RequestDispatcher::reject(&error)
            }
        };

        let mut writer = ResponseWriter::new(stream);
        if let Err(error) = writer.write_response(&response) {
            warn!(target: DISPATCH_TARGET, %error, "failed to write response");
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, mut stream: UnixStream) {
        self.serve(&mut stream);
    }
}

/// Reads up to the first newline, excluding it.
///
/// Returns `Ok(None)` when the peer closes before a newline arrives.
fn read_request_line<S: Read>(stream: &mut S) -> Result<Option<Vec<u8>>, DispatchError> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];

    loop {
        let bytes_read = read_with_retry(stream, &mut chunk)?;
        if bytes_read == 0 {
            return Ok(None);
        }

        let read = chunk.get(..bytes_read).unwrap_or_default();
        if let Some(newline_pos) = read.iter().position(|b| *b == b'\n') {
            buffer.extend(read.iter().take(newline_pos));
            enforce_limit(buffer.len())?;
            return Ok(Some(buffer));
        }

        buffer.extend_from_slice(read);
        enforce_limit(buffer.len())?;
    }
}

/// Reads from the stream, retrying on interrupts.
fn read_with_retry<S: Read>(stream: &mut S, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

/// Enforces the maximum request size limit.
fn enforce_limit(size: usize) -> Result<(), DispatchError> {
    if size > MAX_REQUEST_BYTES {
        return Err(DispatchError::request_too_large(size, MAX_REQUEST_BYTES));
    }
    Ok(())
}
