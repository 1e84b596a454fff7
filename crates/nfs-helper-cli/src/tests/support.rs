//! Harness types for running the client against a fake helper.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use anyhow::{Context, Result, anyhow, ensure};
use camino::Utf8PathBuf;
use nfs_helper_config::Config;
use tempfile::TempDir;

use crate::{AppError, ConfigLoader, run_with_loader};

pub(super) const EMPTY_LIST_RESPONSE: &str = r#"{"ok":true,"result":[],"request_id":"cli-1"}"#;
pub(super) const NOT_FOUND_RESPONSE: &str =
    r#"{"ok":false,"error":"Export not found: /not/there","code":"NOT_FOUND","request_id":""}"#;

struct StaticConfigLoader {
    config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Accepts one connection, records the request line and replies.
struct FakeHelper {
    handle: thread::JoinHandle<Result<String>>,
}

impl FakeHelper {
    fn spawn(socket: &Path, reply: Option<String>) -> Result<Self> {
        let listener = UnixListener::bind(socket).context("bind fake helper")?;
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().context("accept client")?;
            let mut reader = BufReader::new(stream.try_clone().context("clone stream")?);
            let mut request = String::new();
            reader.read_line(&mut request).context("read request")?;
            if let Some(line) = reply {
                let mut writer = stream;
                writer.write_all(line.as_bytes()).context("write reply")?;
                writer.write_all(b"\n").context("write newline")?;
            }
            Ok(request.trim_end().to_owned())
        });
        Ok(Self { handle })
    }

    fn request(self) -> Result<String> {
        self.handle
            .join()
            .map_err(|_| anyhow!("fake helper thread panicked"))?
    }
}

pub(super) struct TestWorld {
    dir: TempDir,
    helper: Option<FakeHelper>,
    reply: Option<String>,
    pub(super) request: Option<String>,
    pub(super) stdout: Vec<u8>,
    pub(super) stderr: Vec<u8>,
    pub(super) exit_code: Option<ExitCode>,
}

impl TestWorld {
    pub(super) fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new().context("create temporary directory")?,
            helper: None,
            reply: None,
            request: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: None,
        })
    }

    fn socket_path(&self) -> PathBuf {
        self.dir.path().join("helper.sock")
    }

    pub(super) fn start_helper(&mut self, reply: Option<&str>) -> Result<()> {
        self.reply = reply.map(str::to_owned);
        self.helper = Some(FakeHelper::spawn(
            &self.socket_path(),
            self.reply.clone(),
        )?);
        Ok(())
    }

    pub(super) fn run(&mut self, command: &str) -> Result<()> {
        let socket = Utf8PathBuf::from_path_buf(self.socket_path())
            .map_err(|path| anyhow!("socket path {} is not UTF-8", path.display()))?;
        let loader = StaticConfigLoader {
            config: Config {
                socket,
                ..Config::default()
            },
        };
        let args = std::iter::once("nfs-helper")
            .chain(command.split_whitespace())
            .map(OsString::from)
            .collect::<Vec<_>>();
        self.exit_code = Some(run_with_loader(
            args,
            &mut self.stdout,
            &mut self.stderr,
            &loader,
        ));
        if let Some(helper) = self.helper.take() {
            self.request = Some(helper.request()?);
        }
        Ok(())
    }

    pub(super) fn reply(&self) -> Option<&str> {
        self.reply.as_deref()
    }

    pub(super) fn stdout_text(&self) -> Result<String> {
        String::from_utf8(self.stdout.clone()).context("stdout is not UTF-8")
    }

    pub(super) fn stderr_text(&self) -> Result<String> {
        String::from_utf8(self.stderr.clone()).context("stderr is not UTF-8")
    }

    pub(super) fn assert_exit_code(&self, expected: u8) -> Result<()> {
        let exit = self.exit_code.context("exit code recorded")?;
        ensure!(
            exit == ExitCode::from(expected),
            "expected exit code {expected}, got {exit:?}; stderr: {}",
            String::from_utf8_lossy(&self.stderr)
        );
        Ok(())
    }
}
