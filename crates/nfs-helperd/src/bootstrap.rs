//! Configuration loading and collaborator wiring for the daemon.

use std::sync::Arc;

use nfs_helper_config::Config;
use ortho_config::{OrthoConfig, OrthoError};

use crate::command::CommandRunner;
use crate::dispatch::{DispatchConnectionHandler, RequestDispatcher, RequestRouter};
use crate::exports::ExportStore;
use crate::quota::QuotaManager;
use crate::reload::ExportfsReload;
use crate::sessions::SessionSource;

/// Trait abstracting configuration loading for testability.
pub(crate) trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Builds the connection handler from the resolved configuration.
///
/// Every path and timeout comes from `config`; `runner` executes
/// `exportfs` and `xfs_quota`.
pub(crate) fn build_handler(
    config: &Config,
    runner: Arc<dyn CommandRunner>,
) -> DispatchConnectionHandler {
    let store = ExportStore::new(config);
    let reload = Arc::new(ExportfsReload::new(
        Arc::clone(&runner),
        config.reload_timeout(),
    ));
    let quota = QuotaManager::new(config, runner);
    let sessions = SessionSource::new(config.proc_root().as_std_path());
    let router = RequestRouter::new(store, reload, quota, sessions);
    DispatchConnectionHandler::new(RequestDispatcher::new(router))
}
