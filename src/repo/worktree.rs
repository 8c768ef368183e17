//! Ephemeral secondary checkout
//!
//! Each local submission works in its own temporary directory registered as a
//! git worktree, checked out on local branches private to that submission.
//! Two submissions for the same record therefore never contend for a local
//! branch; they only meet at the remote, where the push reports the conflict.
//!
//! Everything is removed on every exit path: explicitly via
//! [`IsolatedWorktree::release`], or from `Drop` when the submission future is
//! dropped mid-flight.

use crate::repo::GitRunner;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, warn};

const DIR_PREFIX: &str = "record-worktree-";
const BRANCH_NAMESPACE: &str = "record-pr";
const DROP_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A uniquely named temporary directory for one submission's worktree
#[derive(Debug)]
pub struct IsolatedWorktree {
    dir: Option<TempDir>,
    repo_root: PathBuf,
    program: Option<String>,
    tag: String,
    registered: bool,
    branches: Vec<String>,
}

impl IsolatedWorktree {
    /// Allocate an empty directory under the system temp dir
    ///
    /// `program` is the git executable used if the guard is dropped without
    /// [`release`](Self::release); see [`GitRunner::program`].
    pub fn allocate(repo_root: &Path, program: Option<&str>) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(DIR_PREFIX).tempdir()?;
        let tag = dir
            .path()
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix(DIR_PREFIX))
            .unwrap_or_default()
            .to_string();
        debug!(path = %dir.path().display(), "allocated worktree directory");
        Ok(Self {
            dir: Some(dir),
            repo_root: repo_root.to_path_buf(),
            program: program.map(ToString::to_string),
            tag,
            registered: false,
            branches: Vec::new(),
        })
    }

    /// Directory path
    pub fn path(&self) -> &Path {
        self.dir.as_ref().map_or(self.repo_root.as_path(), TempDir::path)
    }

    /// Path as a string for git arguments
    pub fn path_arg(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }

    /// Local branch name private to this worktree for a remote branch
    pub fn local_branch(&self, remote_branch: &str) -> String {
        format!("{BRANCH_NAMESPACE}/{}/{remote_branch}", self.tag)
    }

    /// Record that `git worktree add` succeeded for this directory
    pub const fn mark_registered(&mut self) {
        self.registered = true;
    }

    /// Record a local branch created for this worktree, deleted on release
    pub fn adopt_branch(&mut self, local_branch: String) {
        self.branches.push(local_branch);
    }

    /// Unregister the worktree, delete its branches and the directory
    pub async fn release(mut self, runner: &dyn GitRunner) {
        if self.registered {
            let path = self.path_arg();
            let out = runner
                .run(&self.repo_root, &["worktree", "remove", "--force", &path])
                .await;
            if !out.succeeded {
                warn!(path, output = %out.output, "git worktree remove failed");
            }
            self.registered = false;
        }
        if !self.branches.is_empty() {
            let branches = std::mem::take(&mut self.branches);
            let mut args = vec!["branch", "-D"];
            args.extend(branches.iter().map(String::as_str));
            let out = runner.run(&self.repo_root, &args).await;
            if !out.succeeded {
                warn!(?branches, output = %out.output, "failed to delete worktree branches");
            }
        }
        self.remove_dir();
    }

    fn remove_dir(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!(path = %path.display(), error = %e, "failed to remove worktree directory");
            }
        }
    }

    /// Synchronous counterpart of `release` for `Drop`
    fn cleanup_blocking(&mut self) {
        let Some(program) = self.program.clone() else {
            warn!(
                path = %self.path().display(),
                branches = ?self.branches,
                "worktree dropped without release and no git executable known, registration left behind"
            );
            return;
        };
        if self.registered {
            let path = self.path_arg();
            self.run_bounded(&program, &["worktree", "remove", "--force", &path]);
            self.registered = false;
        }
        if !self.branches.is_empty() {
            let branches = std::mem::take(&mut self.branches);
            let mut args = vec!["branch", "-D"];
            args.extend(branches.iter().map(String::as_str));
            self.run_bounded(&program, &args);
        }
    }

    /// Run git without the async runtime, killing it after `DROP_TIMEOUT`
    fn run_bounded(&self, program: &str, args: &[&str]) {
        let spawned = Command::new(program)
            .args(args)
            .current_dir(&self.repo_root)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!(program, ?args, error = %e, "cannot run git for worktree cleanup");
                return;
            }
        };

        let deadline = Instant::now() + DROP_TIMEOUT;
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => return,
                Ok(Some(status)) => {
                    let mut stderr = String::new();
                    if let Some(mut pipe) = child.stderr.take() {
                        pipe.read_to_string(&mut stderr).ok();
                    }
                    warn!(?args, %status, output = %stderr.trim(), "git worktree cleanup failed");
                    return;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(POLL_INTERVAL),
                Ok(None) => {
                    warn!(?args, timeout_secs = DROP_TIMEOUT.as_secs(), "git worktree cleanup timed out");
                    if let Err(e) = child.kill().and_then(|()| child.wait().map(drop)) {
                        warn!(error = %e, "failed to stop git cleanup process");
                    }
                    return;
                }
                Err(e) => {
                    warn!(?args, error = %e, "failed to wait for git cleanup");
                    return;
                }
            }
        }
    }
}

impl Drop for IsolatedWorktree {
    fn drop(&mut self) {
        if self.registered || !self.branches.is_empty() {
            self.cleanup_blocking();
        }
        self.remove_dir();
    }
}
