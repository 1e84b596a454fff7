//! Command-line client for the privileged NFS helper daemon.
//!
//! The client turns one subcommand into one JSON request line, sends it over
//! the helper's Unix socket and copies the single response line to stdout.
//! The exit status is 0 when the response reports success, 1 when it reports
//! a failure or the invocation is invalid, and 2 when the daemon cannot be
//! reached or answers with something other than a response line.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Write};
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use nfs_helper_config::Config;
use nfs_helper_types::Response;

mod cli;
mod command;
mod config;
mod errors;
mod transport;

use cli::Cli;
use command::HelperRequest;
use config::{ConfigLoader, OrthoConfigLoader, split_arguments};
pub(crate) use errors::AppError;
use transport::connect;

/// Runs the client using the provided arguments and output streams.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_arguments(&args);

    let cli = match Cli::try_parse_from(&split.command_arguments) {
        Ok(cli) => cli,
        Err(error)
            if matches!(
                error.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => return report(stderr, &AppError::CliUsage(error)),
    };

    let result = loader
        .load(&split.config_arguments)
        .and_then(|config| Ok((config, HelperRequest::try_from(cli)?)))
        .and_then(|(config, request)| send(&config, &request, stdout));
    match result {
        Ok(response) if response.ok => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(error) => report(stderr, &error),
    }
}

fn report<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    let _ = writeln!(stderr, "{error}");
    error.exit_code()
}

/// Sends `request` and copies the response line to `stdout`.
fn send<W: Write>(
    config: &Config,
    request: &HelperRequest,
    stdout: &mut W,
) -> Result<Response, AppError> {
    let mut connection = connect(config.socket().as_std_path())?;
    request.write_jsonl(&mut connection)?;

    let mut line = String::new();
    BufReader::new(connection)
        .read_line(&mut line)
        .map_err(AppError::ReadResponse)?;
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        return Err(AppError::MissingResponse);
    }
    let response: Response = serde_json::from_str(trimmed).map_err(AppError::ParseResponse)?;

    writeln!(stdout, "{trimmed}").map_err(AppError::ForwardResponse)?;
    stdout.flush().map_err(AppError::ForwardResponse)?;
    Ok(response)
}

#[cfg(test)]
mod tests;
