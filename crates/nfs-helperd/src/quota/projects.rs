//! Maintenance of the `projects` and `projid` mapping files read by
//! `xfs_quota`.
//!
//! ```text
//! # projects            # projid
//! 4711:/srv/data        xinas_quota_4711:4711
//! ```

use std::fs;
use std::io;
use std::path::Path;

use crate::files::{DEFAULT_FILE_MODE, atomic_write};

/// Name given to the projects the helper creates.
pub(crate) fn project_name(id: u32) -> String {
    format!("xinas_quota_{id}")
}

/// Points project `id` at `directory`, replacing any previous mapping.
pub(crate) fn upsert_project(projects_path: &Path, id: u32, directory: &str) -> io::Result<()> {
    let key = id.to_string();
    upsert_line(projects_path, &format!("{id}:{directory}"), |line| {
        line.split_once(':').is_some_and(|(first, _)| first.trim() == key)
    })
}

/// Records the helper's name for project `id`, replacing any previous name.
pub(crate) fn upsert_project_id(projid_path: &Path, id: u32) -> io::Result<()> {
    let key = id.to_string();
    upsert_line(
        projid_path,
        &format!("{}:{id}", project_name(id)),
        |line| line.rsplit_once(':').is_some_and(|(_, last)| last.trim() == key),
    )
}

fn upsert_line(path: &Path, replacement: &str, matches: impl Fn(&str) -> bool) -> io::Result<()> {
    let existing = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == io::ErrorKind::NotFound => String::new(),
        Err(error) => return Err(error),
    };
    let mut lines = existing
        .lines()
        .filter(|line| line.trim_start().starts_with('#') || !matches(line))
        .map(str::to_owned)
        .collect::<Vec<_>>();
    lines.push(replacement.to_owned());
    let mut text = lines.join("\n");
    text.push('\n');
    atomic_write(path, text.as_bytes(), DEFAULT_FILE_MODE)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn creates_missing_mapping_files() {
        let dir = TempDir::new().expect("temp dir");
        let projects = dir.path().join("projects");
        let projid = dir.path().join("projid");

        upsert_project(&projects, 12, "/srv/data").expect("write projects");
        upsert_project_id(&projid, 12).expect("write projid");

        assert_eq!(fs::read_to_string(projects).expect("read"), "12:/srv/data\n");
        assert_eq!(fs::read_to_string(projid).expect("read"), "xinas_quota_12:12\n");
    }

    #[test]
    fn replaces_only_the_matching_project() {
        let dir = TempDir::new().expect("temp dir");
        let projects = dir.path().join("projects");
        fs::write(&projects, "# local\n1:/srv/one\n12:/srv/old\n120:/srv/other\n")
            .expect("seed projects");

        upsert_project(&projects, 12, "/srv/new").expect("write projects");

        assert_eq!(
            fs::read_to_string(projects).expect("read"),
            "# local\n1:/srv/one\n120:/srv/other\n12:/srv/new\n"
        );
    }

    #[test]
    fn projid_matches_on_trailing_id() {
        let dir = TempDir::new().expect("temp dir");
        let projid = dir.path().join("projid");
        fs::write(&projid, "home:2\nxinas_quota_12:12\nscratch:112\n").expect("seed projid");

        upsert_project_id(&projid, 12).expect("write projid");

        assert_eq!(
            fs::read_to_string(projid).expect("read"),
            "home:2\nscratch:112\nxinas_quota_12:12\n"
        );
    }
}
