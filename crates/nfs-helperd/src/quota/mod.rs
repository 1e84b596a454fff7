//! XFS project quotas for exported directories.
//!
//! Applying a quota maps the directory to a project in the `projects` and
//! `projid` files, initialises the project with `xfs_quota -x -c 'project -s'`
//! and then sets its block limits.

mod errors;
mod mountpoint;
mod projects;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use nfs_helper_config::Config;
use tracing::info;

use crate::command::CommandRunner;
use crate::lock::FileLock;

pub use errors::QuotaError;

const QUOTA_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::quota");
const XFS_QUOTA: &str = "xfs_quota";
/// Largest project id the helper assigns or accepts.
pub const MAX_PROJECT_ID: u32 = 65_535;

/// A validated quota assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaRequest {
    pub path: String,
    pub soft_limit_kb: u64,
    pub hard_limit_kb: u64,
    pub project_id: u32,
}

impl QuotaRequest {
    /// Builds a request, deriving the project id from the path when absent.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError`] when the limits are inverted or the project id
    /// is out of range.
    pub fn new(
        path: impl Into<String>,
        soft_limit_kb: u64,
        hard_limit_kb: u64,
        project_id: Option<u32>,
    ) -> Result<Self, QuotaError> {
        let path = path.into();
        if hard_limit_kb != 0 && hard_limit_kb < soft_limit_kb {
            return Err(QuotaError::InvertedLimits {
                soft: soft_limit_kb,
                hard: hard_limit_kb,
            });
        }
        let project_id = match project_id {
            Some(id) if (1..=MAX_PROJECT_ID).contains(&id) => id,
            Some(id) => {
                return Err(QuotaError::ProjectIdOutOfRange {
                    id,
                    max: MAX_PROJECT_ID,
                });
            }
            None => derive_project_id(&path),
        };
        Ok(Self {
            path,
            soft_limit_kb,
            hard_limit_kb,
            project_id,
        })
    }
}

/// Stable project id in `1..=65535` for `path`, using 32-bit FNV-1a.
#[must_use]
pub fn derive_project_id(path: &str) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    let hash = path.bytes().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(PRIME)
    });
    hash % MAX_PROJECT_ID + 1
}

/// Applies project quotas through `xfs_quota`.
#[derive(Clone)]
pub struct QuotaManager {
    runner: Arc<dyn CommandRunner>,
    lock_path: PathBuf,
    projects_path: PathBuf,
    projid_path: PathBuf,
    timeout: Duration,
}

impl QuotaManager {
    /// Builds a manager over the mapping files named in `config`.
    pub fn new(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_paths(
            runner,
            config.quota_lock_path().as_std_path(),
            config.projects_path().as_std_path(),
            config.projid_path().as_std_path(),
            config.quota_timeout(),
        )
    }

    pub fn with_paths(
        runner: Arc<dyn CommandRunner>,
        lock_path: impl Into<PathBuf>,
        projects_path: impl Into<PathBuf>,
        projid_path: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            lock_path: lock_path.into(),
            projects_path: projects_path.into(),
            projid_path: projid_path.into(),
            timeout,
        }
    }

    /// Maps the directory to its project and applies the block limits.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError::PathNotFound`] when the directory is missing and
    /// other [`QuotaError`] variants when a mapping file or `xfs_quota` fails.
    pub fn apply(&self, request: &QuotaRequest) -> Result<(), QuotaError> {
        let directory = Path::new(&request.path);
        let mountpoint = mountpoint::find_mountpoint(directory).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                QuotaError::PathNotFound {
                    path: request.path.clone(),
                }
            } else {
                QuotaError::Inspect {
                    path: directory.to_path_buf(),
                    source,
                }
            }
        })?;

        self.record_mapping(request)?;

        let id = request.project_id;
        self.xfs_quota(&format!("project -s {id}"), &mountpoint)?;
        self.xfs_quota(
            &format!(
                "limit -p bsoft={}k bhard={}k {id}",
                request.soft_limit_kb, request.hard_limit_kb
            ),
            &mountpoint,
        )?;

        info!(
            target: QUOTA_TARGET,
            path = %request.path,
            project_id = id,
            mountpoint = %mountpoint.display(),
            soft_limit_kb = request.soft_limit_kb,
            hard_limit_kb = request.hard_limit_kb,
            "project quota applied"
        );
        Ok(())
    }

    /// Upserts both mapping files under the quota lock.
    fn record_mapping(&self, request: &QuotaRequest) -> Result<(), QuotaError> {
        let _guard = FileLock::acquire(&self.lock_path).map_err(|source| QuotaError::Lock {
            path: self.lock_path.clone(),
            source,
        })?;
        projects::upsert_project(&self.projects_path, request.project_id, &request.path)
            .map_err(|source| QuotaError::MappingFile {
                path: self.projects_path.clone(),
                source,
            })?;
        projects::upsert_project_id(&self.projid_path, request.project_id).map_err(|source| {
            QuotaError::MappingFile {
                path: self.projid_path.clone(),
                source,
            }
        })
    }

    fn xfs_quota(&self, command: &str, mountpoint: &Path) -> Result<(), QuotaError> {
        let args = [
            String::from("-x"),
            String::from("-c"),
            command.to_owned(),
            mountpoint.to_string_lossy().into_owned(),
        ];
        let output = self.runner.run(XFS_QUOTA, &args, self.timeout)?;
        if output.success() {
            return Ok(());
        }
        Err(QuotaError::ToolFailed {
            command: command.to_owned(),
            stderr: output.stderr.trim().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;
    use std::thread;

    use mockall::mock;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;
    use crate::command::{CommandError, CommandOutput};

    mock! {
        Runner {}
        impl CommandRunner for Runner {
            fn run(
                &self,
                program: &str,
                args: &[String],
                timeout: Duration,
            ) -> Result<CommandOutput, CommandError>;
        }
    }

    struct QuotaFixture {
        dir: TempDir,
    }

    impl QuotaFixture {
        fn share(&self) -> String {
            let share = self.dir.path().join("share");
            fs::create_dir_all(&share).expect("create share");
            share.to_string_lossy().into_owned()
        }

        fn manager(&self, runner: MockRunner) -> QuotaManager {
            QuotaManager::with_paths(
                Arc::new(runner),
                self.dir.path().join("quota.lock"),
                self.dir.path().join("projects"),
                self.dir.path().join("projid"),
                Duration::from_secs(5),
            )
        }

        fn read(&self, name: &str) -> String {
            fs::read_to_string(self.dir.path().join(name)).expect("read mapping file")
        }
    }

    #[fixture]
    fn fixture() -> QuotaFixture {
        QuotaFixture {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn exit(status: i32, stderr: &str) -> CommandOutput {
        CommandOutput {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.to_owned(),
        }
    }

    #[rstest]
    fn applies_project_and_limits(fixture: QuotaFixture) {
        let share = fixture.share();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&calls);
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .times(2)
            .returning(move |program, args, _| {
                assert_eq!(program, XFS_QUOTA);
                recorded.lock().expect("lock calls").push(args[2].clone());
                Ok(exit(0, ""))
            });

        let request = QuotaRequest::new(share.clone(), 1024, 2048, Some(42)).expect("request");
        fixture.manager(runner).apply(&request).expect("apply quota");

        assert_eq!(
            *calls.lock().expect("lock calls"),
            ["project -s 42", "limit -p bsoft=1024k bhard=2048k 42"]
        );
        assert_eq!(fixture.read("projects"), format!("42:{share}\n"));
        assert_eq!(fixture.read("projid"), "xinas_quota_42:42\n");
    }

    #[rstest]
    fn concurrent_applies_keep_every_mapping(fixture: QuotaFixture) {
        let share = fixture.share();
        let mut runner = MockRunner::new();
        runner.expect_run().returning(|_, _, _| Ok(exit(0, "")));
        let manager = Arc::new(fixture.manager(runner));

        let workers = (1..=16_u32)
            .map(|id| {
                let manager = Arc::clone(&manager);
                let request = QuotaRequest::new(share.clone(), 0, 0, Some(id)).expect("request");
                thread::spawn(move || manager.apply(&request).expect("apply quota"))
            })
            .collect::<Vec<_>>();
        for worker in workers {
            worker.join().expect("join worker");
        }

        let mut projects = fixture
            .read("projects")
            .lines()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        projects.sort();
        let mut expected = (1..=16).map(|id| format!("{id}:{share}")).collect::<Vec<_>>();
        expected.sort();
        assert_eq!(projects, expected);
        assert_eq!(fixture.read("projid").lines().count(), 16);
    }

    #[rstest]
    fn missing_directory_is_not_found(fixture: QuotaFixture) {
        let absent = fixture.dir.path().join("absent");
        let request =
            QuotaRequest::new(absent.to_string_lossy(), 0, 0, Some(7)).expect("request");
        let error = fixture
            .manager(MockRunner::new())
            .apply(&request)
            .expect_err("directory is missing");
        assert!(matches!(error, QuotaError::PathNotFound { .. }));
    }

    #[rstest]
    fn tool_failure_reports_stderr(fixture: QuotaFixture) {
        let share = fixture.share();
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .once()
            .returning(|_, _, _| Ok(exit(1, "xfs_quota: not an XFS filesystem\n")));

        let request = QuotaRequest::new(share, 0, 0, Some(3)).expect("request");
        let error = fixture
            .manager(runner)
            .apply(&request)
            .expect_err("tool fails");
        assert_eq!(
            error.to_string(),
            "xfs_quota -c 'project -s 3' failed: xfs_quota: not an XFS filesystem"
        );
    }

    #[rstest]
    #[case::inverted(100, 50, None)]
    #[case::zero_id(0, 0, Some(0))]
    #[case::large_id(0, 0, Some(70_000))]
    fn rejects_invalid_requests(#[case] soft: u64, #[case] hard: u64, #[case] id: Option<u32>) {
        assert!(QuotaRequest::new("/srv/data", soft, hard, id).is_err());
    }

    #[test]
    fn zero_hard_limit_means_unlimited() {
        assert!(QuotaRequest::new("/srv/data", 100, 0, None).is_ok());
    }

    #[test]
    fn derived_project_ids_are_stable_and_in_range() {
        let first = derive_project_id("/srv/data");
        assert_eq!(first, derive_project_id("/srv/data"));
        assert!((1..=MAX_PROJECT_ID).contains(&first));
        assert!((1..=MAX_PROJECT_ID).contains(&derive_project_id("")));
    }
}
