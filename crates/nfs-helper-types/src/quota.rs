//! Project quota requests.

use serde::{Deserialize, Serialize};

/// Block limits to apply to an exported directory through an XFS project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSpec {
    /// Directory to limit. Requests may omit it and supply a top-level `path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Soft block limit in KiB. Zero means unlimited.
    #[serde(default)]
    pub soft_limit_kb: u64,
    /// Hard block limit in KiB. Zero means unlimited.
    #[serde(default)]
    pub hard_limit_kb: u64,
    /// XFS project id. Derived from the path when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u32>,
}
