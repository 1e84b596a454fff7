//! Translation of parsed arguments into helper request lines.

use std::io::Write;

use serde::Serialize;
use serde_json::{Map, Value};

use nfs_helper_types::{ClientSpec, ExportEntry, ExportPatch, QuotaSpec};

use crate::AppError;
use crate::cli::{Cli, CliCommand};

/// One request line in the helper's wire shape.
#[derive(Debug, Serialize)]
pub(crate) struct HelperRequest {
    op: &'static str,
    #[serde(flatten)]
    fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
}

impl TryFrom<Cli> for HelperRequest {
    type Error = AppError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let mut fields = Map::new();
        let op = match cli.command {
            CliCommand::List => "list_exports",
            CliCommand::Add { path, clients } => {
                let entry = ExportEntry::new(path, parse_clients(&clients)?);
                fields.insert(String::from("entry"), to_value(&entry)?);
                "add_export"
            }
            CliCommand::Remove { path } => {
                fields.insert(String::from("path"), Value::String(path));
                "remove_export"
            }
            CliCommand::Update {
                path,
                new_path,
                clients,
            } => {
                let patch = ExportPatch {
                    path: new_path,
                    clients: if clients.is_empty() {
                        None
                    } else {
                        Some(parse_clients(&clients)?)
                    },
                };
                if patch == ExportPatch::default() {
                    return Err(AppError::EmptyUpdate);
                }
                fields.insert(String::from("path"), Value::String(path));
                fields.insert(String::from("patch"), to_value(&patch)?);
                "update_export"
            }
            CliCommand::Sessions { path: None } => "list_sessions",
            CliCommand::Sessions { path: Some(path) } => {
                fields.insert(String::from("path"), Value::String(path));
                "get_sessions"
            }
            CliCommand::Quota {
                path,
                soft_limit_kb,
                hard_limit_kb,
                project_id,
            } => {
                let quota = QuotaSpec {
                    path: Some(path),
                    soft_limit_kb,
                    hard_limit_kb,
                    project_id,
                };
                fields.insert(String::from("quota"), to_value(&quota)?);
                "set_quota"
            }
            CliCommand::Reload => "reload",
        };
        Ok(Self {
            op,
            fields,
            request_id: cli.request_id,
        })
    }
}

impl HelperRequest {
    /// Writes the request followed by the terminating newline.
    pub(crate) fn write_jsonl<W>(&self, writer: &mut W) -> Result<(), AppError>
    where
        W: Write,
    {
        serde_json::to_writer(&mut *writer, self).map_err(AppError::SerialiseRequest)?;
        writer.write_all(b"\n").map_err(AppError::SendRequest)?;
        writer.flush().map_err(AppError::SendRequest)
    }
}

fn parse_clients(tokens: &[String]) -> Result<Vec<ClientSpec>, AppError> {
    tokens
        .iter()
        .map(|token| {
            ClientSpec::parse(token).ok_or_else(|| AppError::InvalidClient {
                token: token.clone(),
            })
        })
        .collect()
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(AppError::SerialiseRequest)
}
