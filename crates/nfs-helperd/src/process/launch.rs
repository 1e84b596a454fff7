//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, build_handler};
use crate::command::{CommandRunner, SystemCommandRunner};
use crate::telemetry;
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) shutdown: S,
    pub(crate) runner: Arc<dyn CommandRunner>,
}

/// Runs the daemon using the production collaborators.
///
/// Returns once a termination signal has been received and the socket has
/// been removed.
///
/// # Errors
///
/// Returns [`LaunchError`] when configuration, telemetry, the socket or
/// signal handling cannot be set up.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(LaunchPlan {
        loader: SystemConfigLoader,
        shutdown: SystemShutdownSignal,
        runner: Arc::new(SystemCommandRunner),
    })
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        shutdown,
        runner,
    } = plan;

    let config = loader.load()?;
    telemetry::initialise(&config)?;
    info!(
        target: PROCESS_TARGET,
        socket = %config.socket(),
        exports = %config.exports_path(),
        "starting nfs helper"
    );

    config.prepare_socket_directory()?;
    let listener = SocketListener::bind(config.socket().as_std_path())?;
    let handler = Arc::new(build_handler(&config, runner));
    let listener_handle = listener.start(handler)?;

    let waited = shutdown.wait();
    if let Ok(cause) = &waited {
        info!(
            target: PROCESS_TARGET,
            %cause,
            socket = %config.socket(),
            "stopping nfs helper and removing socket"
        );
    }
    listener_handle.shutdown();
    listener_handle.join()?;
    waited?;
    info!(target: PROCESS_TARGET, "nfs helper stopped");
    Ok(())
}
