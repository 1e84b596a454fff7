//! Error types for the client runtime.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;

/// Exit status for failures talking to the daemon.
const TRANSPORT_FAILURE: u8 = 2;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("invalid client {token:?}: expected host or host(opt,opt)")]
    InvalidClient { token: String },
    #[error("update needs --new-path or at least one --client")]
    EmptyUpdate,
    #[error("failed to connect to helper at {socket}: {source}")]
    Connect { socket: String, source: io::Error },
    #[error("failed to serialise request: {0}")]
    SerialiseRequest(serde_json::Error),
    #[error("failed to send request to helper: {0}")]
    SendRequest(io::Error),
    #[error("failed to read response from helper: {0}")]
    ReadResponse(io::Error),
    #[error("helper closed the connection without responding")]
    MissingResponse,
    #[error("failed to parse helper response: {0}")]
    ParseResponse(serde_json::Error),
    #[error("failed to print helper response: {0}")]
    ForwardResponse(io::Error),
}

impl AppError {
    /// Exit status reported for this error.
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::LoadConfiguration(_)
            | Self::CliUsage(_)
            | Self::InvalidClient { .. }
            | Self::EmptyUpdate
            | Self::ForwardResponse(_) => ExitCode::FAILURE,
            Self::Connect { .. }
            | Self::SerialiseRequest(_)
            | Self::SendRequest(_)
            | Self::ReadResponse(_)
            | Self::MissingResponse
            | Self::ParseResponse(_) => ExitCode::from(TRANSPORT_FAILURE),
        }
    }
}
