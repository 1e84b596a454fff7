//! Configuration loader rooted in a temporary directory.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use camino::Utf8PathBuf;
use nfs_helper_config::Config;
use ortho_config::OrthoError;
use tempfile::TempDir;

use crate::bootstrap::ConfigLoader;

/// Loader that places every helper path under one temporary directory.
#[derive(Clone)]
pub(crate) struct TestConfigLoader {
    dir: Arc<TempDir>,
}

impl TestConfigLoader {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temporary directory for helper");
        fs::create_dir_all(dir.path().join("etc")).expect("failed to create exports directory");
        Self { dir: Arc::new(dir) }
    }

    pub(crate) fn config(&self) -> Config {
        Config {
            socket: self.utf8("run/nfs-helper.sock"),
            exports_path: self.utf8("etc/exports"),
            lock_path: self.utf8("run/exports.lock"),
            quota_lock_path: self.utf8("run/quota.lock"),
            projects_path: self.utf8("etc/projects"),
            projid_path: self.utf8("etc/projid"),
            proc_root: self.utf8("proc"),
            reload_timeout_secs: 5,
            quota_timeout_secs: 5,
            ..Config::default()
        }
    }

    pub(crate) fn socket_path(&self) -> PathBuf {
        self.config().socket.into_std_path_buf()
    }

    pub(crate) fn exports_path(&self) -> PathBuf {
        self.config().exports_path.into_std_path_buf()
    }

    pub(crate) fn run_dir(&self) -> PathBuf {
        self.dir.path().join("run")
    }

    fn utf8(&self, relative: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().join(relative))
            .expect("temporary directory path was not valid UTF-8")
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config())
    }
}
