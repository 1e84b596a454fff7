//! Line-level request dispatch.

use nfs_helper_types::{ErrorCode, Response};
use tracing::{error, info, warn};

use super::errors::DispatchError;
use super::request::{EnvelopeError, RequestEnvelope};
use super::router::{DISPATCH_TARGET, RequestRouter};

/// Turns one request line into one response.
///
/// Every failure, including an unparseable line, becomes an `ok:false`
/// response; nothing here terminates the process.
#[derive(Clone)]
pub struct RequestDispatcher {
    router: RequestRouter,
}

impl RequestDispatcher {
    pub fn new(router: RequestRouter) -> Self {
        Self { router }
    }

    /// Dispatches the bytes of a single request line.
    #[must_use]
    pub fn dispatch_line(&self, line: &[u8]) -> Response {
        let envelope = match RequestEnvelope::parse(line) {
            Ok(envelope) => envelope,
            Err(EnvelopeError { request_id, error }) => {
                return failure_response(None, &request_id, &error);
            }
        };

        let operation = envelope.operation.as_str();
        let request_id = envelope.request_id.clone();
        info!(
            target: DISPATCH_TARGET,
            op = operation,
            request_id = %request_id,
            "dispatching request"
        );

        match envelope
            .into_request()
            .and_then(|request| self.router.route(request))
        {
            Ok(result) => Response::success(result, request_id),
            Err(error) => failure_response(Some(operation), &request_id, &error),
        }
    }

    /// Builds the response for a request that never reached the router.
    #[must_use]
    pub fn reject(error: &DispatchError) -> Response {
        failure_response(None, "", error)
    }
}

fn failure_response(op: Option<&str>, request_id: &str, error: &DispatchError) -> Response {
    let code = error.code();
    let op = op.unwrap_or("-");
    if code == ErrorCode::Internal {
        error!(target: DISPATCH_TARGET, op, request_id, %code, %error, "request failed");
    } else {
        warn!(target: DISPATCH_TARGET, op, request_id, %code, %error, "request rejected");
    }
    Response::failure(code, error.to_string(), request_id)
}
