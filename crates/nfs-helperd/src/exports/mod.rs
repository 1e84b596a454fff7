//! The managed NFS export table.

mod errors;
mod format;
mod store;

pub use errors::StoreError;
pub use store::ExportStore;

pub(crate) const STORE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::store");
