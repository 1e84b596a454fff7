//! Line grammar of the NFS export table.
//!
//! ```text
//! # comment
//! /srv/data  10.0.0.0/24(rw,sync) backup.example.com
//! "/srv/with space"  *(ro)
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use nfs_helper_types::{ClientSpec, ExportEntry};

/// Comment written at the top of every table the helper rewrites.
pub(crate) const MANAGED_HEADER: &str = "# Managed by xinas-nfs-helper - do not edit manually";

#[expect(
    clippy::expect_used,
    reason = "the pattern is a literal that is covered by unit tests"
)]
static CLIENT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\S+?)(?:\(([^)]*)\))?(?:\s|$)").expect("client token pattern compiles")
});

/// A line of the table that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParseError {
    /// One-based line number.
    pub(crate) line: usize,
    pub(crate) message: String,
}

/// Parses the complete table text into entries in file order.
///
/// Blank lines, comments and lines without any client are skipped.
pub(crate) fn parse_exports(text: &str) -> Result<Vec<ExportEntry>, ParseError> {
    let mut entries = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (path, rest) = split_path(line).ok_or_else(|| ParseError {
            line: index + 1,
            message: String::from("quoted export path is missing its closing quote"),
        })?;
        let clients = parse_clients(rest);
        if !clients.is_empty() {
            entries.push(ExportEntry::new(path, clients));
        }
    }
    Ok(entries)
}

fn split_path(line: &str) -> Option<(&str, &str)> {
    if let Some(quoted) = line.strip_prefix('"') {
        let (path, rest) = quoted.split_once('"')?;
        return Some((path, rest.trim()));
    }
    match line.split_once(char::is_whitespace) {
        Some((path, rest)) => Some((path, rest.trim())),
        None => Some((line, "")),
    }
}

fn parse_clients(rest: &str) -> Vec<ClientSpec> {
    CLIENT_TOKEN
        .captures_iter(rest)
        .filter_map(|captures| {
            let host = captures.get(1).map_or("", |host| host.as_str());
            if host.is_empty() {
                return None;
            }
            let options = captures
                .get(2)
                .map_or("", |options| options.as_str())
                .split(',')
                .map(str::trim)
                .filter(|option| !option.is_empty())
                .map(str::to_owned)
                .collect::<Vec<_>>();
            Some(ClientSpec {
                host: host.to_owned(),
                options,
            })
        })
        .collect()
}

/// Renders entries as a complete table, header included.
pub(crate) fn serialize_exports(entries: &[ExportEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 2);
    lines.push(MANAGED_HEADER.to_owned());
    lines.push(String::new());
    for entry in entries {
        let clients = entry
            .clients
            .iter()
            .map(render_client)
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("{}  {clients}", render_path(&entry.path)));
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Quotes paths that would otherwise read back as a comment, a quoted path or
/// a different token.
fn render_path(path: &str) -> String {
    let needs_quotes = path.is_empty()
        || path.starts_with(['#', '"'])
        || path.chars().any(char::is_whitespace);
    if needs_quotes {
        format!("\"{path}\"")
    } else {
        path.to_owned()
    }
}

fn render_client(client: &ClientSpec) -> String {
    if client.options.is_empty() {
        client.host.clone()
    } else {
        format!("{}({})", client.host, client.options.join(","))
    }
}
