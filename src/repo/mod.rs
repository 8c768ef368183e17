//! Local git toolchain access
//!
//! Every git invocation goes through [`GitRunner`], which returns a structured
//! [`CommandOutput`] instead of raising. The submission flow decides what a
//! failure means; this module only runs commands and classifies their output.

mod classify;
mod probe;
mod worktree;

pub use classify::{PushFailure, classify_push_failure};
pub use probe::probe_environment;
pub use worktree::IsolatedWorktree;

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Captured result of one git invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status was zero
    pub succeeded: bool,
    /// Exit code, `None` if the process could not run or was killed
    pub code: Option<i32>,
    /// Combined stdout and stderr, trimmed
    pub output: String,
}

impl CommandOutput {
    /// Successful output
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            code: Some(0),
            output: output.into(),
        }
    }

    /// Failed output with an exit code
    pub fn failed(code: i32, output: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            code: Some(code),
            output: output.into(),
        }
    }

    /// Process never produced an exit code (spawn failure, timeout)
    pub fn not_run(output: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            code: None,
            output: output.into(),
        }
    }
}

/// Runs git commands
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Run `git <args>` in `cwd`
    async fn run(&self, cwd: &Path, args: &[&str]) -> CommandOutput;

    /// Executable for synchronous cleanup when the async path cannot run
    ///
    /// `None` when the runner has no real executable behind it.
    fn program(&self) -> Option<&str> {
        None
    }
}

/// [`GitRunner`] backed by the `git` executable
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: String,
    timeout: Duration,
}

impl SystemGit {
    /// Use `git` from `PATH`
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("git", timeout)
    }

    /// Use a specific git executable
    pub fn with_program(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl GitRunner for SystemGit {
    async fn run(&self, cwd: &Path, args: &[&str]) -> CommandOutput {
        debug!(cwd = %cwd.display(), "git {}", args.join(" "));

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .current_dir(cwd)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return CommandOutput::not_run(format!("failed to run git: {e}")),
            Err(_) => {
                return CommandOutput::not_run(format!(
                    "git {} timed out after {}s",
                    args.first().unwrap_or(&""),
                    self.timeout.as_secs()
                ));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let text = [stdout.trim(), stderr.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        CommandOutput {
            succeeded: output.status.success(),
            code: output.status.code(),
            output: text,
        }
    }

    fn program(&self) -> Option<&str> {
        Some(&self.program)
    }
}

/// Branch checked out in `repo_root`, `None` when detached or unreadable
pub async fn current_branch(runner: &dyn GitRunner, repo_root: &Path) -> Option<String> {
    let out = runner
        .run(repo_root, &["rev-parse", "--abbrev-ref", "HEAD"])
        .await;
    let branch = out.output.trim();
    (out.succeeded && !branch.is_empty() && branch != "HEAD").then(|| branch.to_string())
}

/// Subject line of the HEAD commit in `repo_root`
pub async fn last_commit_subject(runner: &dyn GitRunner, repo_root: &Path) -> Option<String> {
    let out = runner
        .run(repo_root, &["--no-pager", "log", "-1", "--pretty=%s"])
        .await;
    let subject = out.output.trim();
    (out.succeeded && !subject.is_empty()).then(|| subject.to_string())
}
