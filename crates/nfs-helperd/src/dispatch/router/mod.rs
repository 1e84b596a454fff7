//! Operation routing for decoded requests.
//!
//! The router matches exhaustively on [`Request`], so adding an operation is
//! a compile error until it is handled here.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::errors::DispatchError;
use super::request::Request;
use crate::exports::ExportStore;
use crate::quota::QuotaManager;
use crate::reload::ReloadTrigger;
use crate::sessions::SessionSource;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Routes requests to the store and the collaborators.
#[derive(Clone)]
pub struct RequestRouter {
    store: ExportStore,
    reload: Arc<dyn ReloadTrigger>,
    quota: QuotaManager,
    sessions: SessionSource,
}

impl RequestRouter {
    pub fn new(
        store: ExportStore,
        reload: Arc<dyn ReloadTrigger>,
        quota: QuotaManager,
        sessions: SessionSource,
    ) -> Self {
        Self {
            store,
            reload,
            quota,
            sessions,
        }
    }

    /// Carries out `request` and returns its JSON result.
    ///
    /// Export mutations reload the NFS server after the table is written; a
    /// failed reload fails the request although the table has changed.
    ///
    /// # Errors
    ///
    /// Returns the [`DispatchError`] raised by the store or collaborator.
    pub fn route(&self, request: Request) -> Result<Value, DispatchError> {
        debug!(
            target: DISPATCH_TARGET,
            operation = request.operation().as_str(),
            "routing request"
        );
        match request {
            Request::ListExports => to_result(&self.store.list()?),
            Request::AddExport { entry } => {
                self.store.add(entry)?;
                self.reload()
            }
            Request::RemoveExport { path } => {
                self.store.remove(&path)?;
                self.reload()
            }
            Request::UpdateExport { path, patch } => {
                self.store.update(&path, patch)?;
                self.reload()
            }
            Request::ListSessions => to_result(&self.sessions.list()?),
            Request::GetSessions { path } => to_result(&self.sessions.for_path(&path)?),
            Request::SetQuota(quota) => {
                self.quota.apply(&quota)?;
                Ok(Value::Null)
            }
            Request::Reload => self.reload(),
        }
    }

    fn reload(&self) -> Result<Value, DispatchError> {
        self.reload.reload()?;
        Ok(Value::Null)
    }
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, DispatchError> {
    serde_json::to_value(value).map_err(DispatchError::SerializeResult)
}
