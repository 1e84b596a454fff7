//! Export table entries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One client allowed to mount an export, with its export options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSpec {
    /// Hostname, address, network pattern or wildcard.
    pub host: String,
    /// Export options in on-file order, for example `rw` or `no_root_squash`.
    #[serde(default)]
    pub options: Vec<String>,
}

impl ClientSpec {
    /// Builds a client specification.
    pub fn new<I, S>(host: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            host: host.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses the `host(opt1,opt2)` or bare `host` form used on the command
    /// line and in the exports file.
    ///
    /// Returns `None` when the host part is empty or the parentheses are
    /// unbalanced.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let (host, options) = match token.split_once('(') {
            Some((host, rest)) => {
                let inner = rest.strip_suffix(')')?;
                let options = inner
                    .split(',')
                    .map(str::trim)
                    .filter(|option| !option.is_empty())
                    .map(str::to_owned)
                    .collect();
                (host, options)
            }
            None => (token, Vec::new()),
        };
        if host.is_empty() {
            return None;
        }
        Some(Self {
            host: host.to_owned(),
            options,
        })
    }
}

/// A single exported path and the clients allowed to mount it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    /// Exported filesystem path. Unique within the export table.
    pub path: String,
    /// Permitted clients in on-file order.
    #[serde(default)]
    pub clients: Vec<ClientSpec>,
}

impl ExportEntry {
    /// Builds an export entry.
    pub fn new(path: impl Into<String>, clients: Vec<ClientSpec>) -> Self {
        Self {
            path: path.into(),
            clients,
        }
    }

    /// Checks that the entry survives a write and re-read of the exports
    /// file unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError`] describing the first offending field.
    pub fn validate(&self) -> Result<(), EntryError> {
        validate_path(&self.path)?;
        if self.clients.is_empty() {
            return Err(EntryError::NoClients {
                path: self.path.clone(),
            });
        }
        for client in &self.clients {
            validate_client(client)?;
        }
        Ok(())
    }

    /// Applies the fields present in `patch`, leaving the others untouched.
    pub fn apply(&mut self, patch: ExportPatch) {
        if let Some(path) = patch.path {
            self.path = path;
        }
        if let Some(clients) = patch.clients {
            self.clients = clients;
        }
    }
}

/// Shallow merge patch for an [`ExportEntry`].
///
/// Fields that are absent leave the entry unchanged. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPatch {
    /// Replacement path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Replacement client list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<ClientSpec>>,
}

/// Reasons an export entry cannot be stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// The path is empty or blank.
    #[error("export path must not be empty")]
    EmptyPath,
    /// The path would be read back as a comment or a different path.
    #[error("export path {path:?} starts with '#' or contains a double quote or line break")]
    UnrepresentablePath {
        /// Offending path.
        path: String,
    },
    /// The entry lists no clients and would be dropped on re-read.
    #[error("export {path:?} must list at least one client")]
    NoClients {
        /// Path of the entry.
        path: String,
    },
    /// A client has an empty host.
    #[error("client host must not be empty")]
    EmptyHost,
    /// A host would be split or misread by the table grammar.
    #[error("client host {host:?} contains whitespace or parentheses")]
    InvalidHost {
        /// Offending host.
        host: String,
    },
    /// An option would be split or misread by the table grammar.
    #[error("option {option:?} for host {host:?} is empty or contains ',', '(', ')' or whitespace")]
    InvalidOption {
        /// Host the option belongs to.
        host: String,
        /// Offending option.
        option: String,
    },
}

fn validate_path(path: &str) -> Result<(), EntryError> {
    if path.trim().is_empty() {
        return Err(EntryError::EmptyPath);
    }
    if path.starts_with('#') || path.contains(['"', '\n', '\r']) {
        return Err(EntryError::UnrepresentablePath {
            path: path.to_owned(),
        });
    }
    Ok(())
}

fn validate_client(client: &ClientSpec) -> Result<(), EntryError> {
    if client.host.is_empty() {
        return Err(EntryError::EmptyHost);
    }
    if client
        .host
        .chars()
        .any(|ch| ch.is_whitespace() || ch == '(' || ch == ')')
    {
        return Err(EntryError::InvalidHost {
            host: client.host.clone(),
        });
    }
    for option in &client.options {
        let malformed = option.is_empty()
            || option
                .chars()
                .any(|ch| ch.is_whitespace() || matches!(ch, ',' | '(' | ')'));
        if malformed {
            return Err(EntryError::InvalidOption {
                host: client.host.clone(),
                option: option.clone(),
            });
        }
    }
    Ok(())
}
