//! Local toolchain availability probe

use crate::repo::{GitRunner, current_branch, last_commit_subject};
use crate::types::ProbeReport;
use std::path::Path;
use tracing::info;

/// Check whether the local git path can be used for `repo_root`
///
/// Requires a `.git` entry (directory, or file for linked worktrees) and a
/// successful read-only `git status`. Runs no mutating command.
pub async fn probe_environment(runner: &dyn GitRunner, repo_root: &Path) -> ProbeReport {
    if !repo_root.join(".git").exists() {
        let report = ProbeReport {
            usable: false,
            detail: format!("no .git in {}", repo_root.display()),
            current_branch: None,
            head_subject: None,
        };
        info!(detail = %report.detail, "local toolchain unusable");
        return report;
    }

    let status = runner.run(repo_root, &["status", "--porcelain"]).await;
    if !status.succeeded {
        info!(detail = %status.output, "git status failed, local toolchain unusable");
        return ProbeReport {
            usable: false,
            detail: status.output,
            current_branch: None,
            head_subject: None,
        };
    }

    ProbeReport {
        usable: true,
        detail: if status.output.is_empty() {
            "git status: clean".to_string()
        } else {
            format!("git status:\n{}", status.output)
        },
        current_branch: current_branch(runner, repo_root).await,
        head_subject: last_commit_subject(runner, repo_root).await,
    }
}
