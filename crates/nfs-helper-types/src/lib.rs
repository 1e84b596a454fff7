//! Wire and domain types shared by the NFS helper daemon and its clients.
//!
//! Both sides of the newline-delimited JSON protocol depend on this crate so
//! the shapes of export entries, quota requests, session records and the
//! response envelope cannot drift apart.

mod export;
mod quota;
mod response;
mod session;

pub use export::{ClientSpec, EntryError, ExportEntry, ExportPatch};
pub use quota::QuotaSpec;
pub use response::{ErrorCode, Response};
pub use session::{SessionInfo, UNKNOWN_EXPORT_PATH};
