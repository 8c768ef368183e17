//! Local git committer
//!
//! Cuts a branch from the source branch, commits the record in an isolated
//! worktree and pushes it to the unique remote branch. The primary checkout is
//! only used for ref operations (`fetch`, `branch`, `worktree add`); its HEAD
//! never moves.
//!
//! The local branch is private to the worktree (see
//! [`IsolatedWorktree::local_branch`]) and pushed with an explicit
//! `<local>:refs/heads/<unique>` refspec, so concurrent submissions of the same
//! record race only at the remote and resolve there like any push conflict.
//! Branch names always reach git as full refs or after validation, never as
//! something git could read as an option.

use crate::branch::{BranchNamer, BranchPlan};
use crate::config::CommitIdentity;
use crate::error::Error;
use crate::repo::{GitRunner, IsolatedWorktree, PushFailure, classify_push_failure};
use crate::submit::{Committer, StepLog};
use crate::types::{CommitOutcome, CommitterKind, StepStatus, SubmissionRequest};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const FORCE_STEP: &str = "git push --force-with-lease (worktree)";

fn refspec(local_branch: &str, remote_branch: &str) -> String {
    format!("{local_branch}:refs/heads/{remote_branch}")
}

/// Commits through the local git toolchain
pub struct LocalVcsCommitter {
    runner: Arc<dyn GitRunner>,
    namer: Arc<BranchNamer>,
    repo_root: PathBuf,
    remote: String,
    identity: CommitIdentity,
}

impl LocalVcsCommitter {
    /// Create a committer for the repository at `repo_root`
    pub fn new(
        runner: Arc<dyn GitRunner>,
        namer: Arc<BranchNamer>,
        repo_root: PathBuf,
        remote: String,
        identity: CommitIdentity,
    ) -> Self {
        Self {
            runner,
            namer,
            repo_root,
            remote,
            identity,
        }
    }

    /// Steps 1-3: refresh refs, ensure the source branch, force-create the worktree branch
    async fn prepare_branch(
        &self,
        request: &SubmissionRequest,
        local_branch: &str,
        log: &mut StepLog<'_>,
    ) -> bool {
        let root = &self.repo_root;
        let source = request.source_branch();
        let source_ref = format!("refs/heads/{source}");

        let out = self
            .runner
            .run(root, &["fetch", &self.remote, "--prune"])
            .await;
        if !log.command("git fetch", &out).await {
            return false;
        }

        let exists = self
            .runner
            .run(root, &["rev-parse", "--verify", "--quiet", &source_ref])
            .await;
        if !exists.succeeded {
            debug!(source, "source branch missing locally, tracking remote");
            let tracking_ref = format!("refs/remotes/{}/{source}", self.remote);
            let fetch_spec = format!("+{source_ref}:{tracking_ref}");
            let fetched = self
                .runner
                .run(root, &["fetch", &self.remote, &fetch_spec])
                .await;
            if !fetched.succeeded {
                return log.command("create local tracking branch", &fetched).await;
            }
            let tracked = self
                .runner
                .run(root, &["branch", "--track", source, &tracking_ref])
                .await;
            if !log.command("create local tracking branch", &tracked).await {
                return false;
            }
        }

        let out = self
            .runner
            .run(root, &["branch", "-f", local_branch, &source_ref])
            .await;
        log.command("create unique branch", &out).await
    }

    /// Steps 4-9 inside the isolated worktree
    async fn commit_in_worktree(
        &self,
        request: &SubmissionRequest,
        plan: &BranchPlan,
        worktree: &mut IsolatedWorktree,
        log: &mut StepLog<'_>,
    ) -> CommitOutcome {
        let mut outcome = CommitOutcome {
            branch_used: plan.unique_branch.clone(),
            succeeded: false,
        };
        let local_branch = worktree.local_branch(&plan.unique_branch);
        let wt_arg = worktree.path_arg();

        let out = self
            .runner
            .run(
                &self.repo_root,
                &["worktree", "add", &wt_arg, &local_branch],
            )
            .await;
        if !log.command("git worktree add", &out).await {
            return outcome;
        }
        worktree.mark_registered();
        let wt = worktree.path().to_path_buf();

        let target = wt.join(request.file_path());
        let written = async {
            let content = request.serialized_record()?;
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&target, content).await?;
            Ok::<_, Error>(())
        }
        .await;
        let written_ok = match written {
            Ok(()) => log.succeeded("write record file", request.file_path()).await,
            Err(e) => log.failed("write record file", e.to_string()).await,
        };
        if !written_ok {
            return outcome;
        }

        let out = self
            .runner
            .run(&wt, &["add", "--", request.file_path()])
            .await;
        if !log.command("git add (worktree)", &out).await {
            return outcome;
        }

        if !self.commit_staged(request, &wt, log).await {
            return outcome;
        }

        let spec = refspec(&local_branch, &plan.unique_branch);
        let out = self.runner.run(&wt, &["push", &self.remote, &spec]).await;
        if out.succeeded {
            log.succeeded("git push (worktree)", out.output).await;
            outcome.succeeded = true;
            return outcome;
        }

        let failure = classify_push_failure(&out.output);
        if !failure.is_conflict() {
            log.failed("git push (worktree)", out.output).await;
            return outcome;
        }
        log.record("git push (worktree)", StepStatus::Rejected, out.output)
            .await;

        self.resolve_conflict(plan, &local_branch, worktree, log)
            .await
    }

    /// Step 7: commit only when the stage is non-empty
    async fn commit_staged(
        &self,
        request: &SubmissionRequest,
        wt: &Path,
        log: &mut StepLog<'_>,
    ) -> bool {
        let diff = self
            .runner
            .run(wt, &["diff", "--cached", "--quiet"])
            .await;
        match diff.code {
            Some(0) => {
                log.skipped("git commit (worktree)", "nothing to commit")
                    .await
            }
            Some(1) => {
                let name = format!("user.name={}", self.identity.name);
                let email = format!("user.email={}", self.identity.email);
                let out = self
                    .runner
                    .run(
                        wt,
                        &[
                            "-c",
                            &name,
                            "-c",
                            &email,
                            "commit",
                            "-m",
                            request.commit_message(),
                        ],
                    )
                    .await;
                log.command("git commit (worktree)", &out).await
            }
            _ => log.failed("git commit (worktree)", diff.output).await,
        }
    }

    /// Step 9: conditional force, then at most one branch escalation
    async fn resolve_conflict(
        &self,
        plan: &BranchPlan,
        local_branch: &str,
        worktree: &mut IsolatedWorktree,
        log: &mut StepLog<'_>,
    ) -> CommitOutcome {
        let mut outcome = CommitOutcome {
            branch_used: plan.unique_branch.clone(),
            succeeded: false,
        };
        let wt = worktree.path().to_path_buf();

        // The lease compares against this remote-tracking ref
        let refetch_spec = format!(
            "+refs/heads/{0}:refs/remotes/{1}/{0}",
            plan.unique_branch, self.remote
        );
        let refetch = self
            .runner
            .run(&wt, &["fetch", &self.remote, &refetch_spec])
            .await;
        debug!(ok = refetch.succeeded, output = %refetch.output, "re-fetched rejected branch");

        let spec = refspec(local_branch, &plan.unique_branch);
        let out = self
            .runner
            .run(&wt, &["push", "--force-with-lease", &self.remote, &spec])
            .await;
        if out.succeeded {
            log.succeeded(FORCE_STEP, out.output).await;
            outcome.succeeded = true;
            return outcome;
        }
        if classify_push_failure(&out.output) != PushFailure::PolicyRejected {
            log.failed(FORCE_STEP, out.output).await;
            return outcome;
        }
        log.record(FORCE_STEP, StepStatus::Rejected, out.output).await;

        let escalated = self.namer.escalate(plan);
        info!(branch = %escalated.unique_branch, "force push refused by policy, escalating branch name");
        outcome.branch_used.clone_from(&escalated.unique_branch);
        let escalated_local = worktree.local_branch(&escalated.unique_branch);

        let out = self
            .runner
            .run(&wt, &["branch", "-f", &escalated_local, "HEAD"])
            .await;
        if !log.command("create alternate branch name", &out).await {
            return outcome;
        }
        worktree.adopt_branch(escalated_local.clone());

        let out = self
            .runner
            .run(&wt, &["checkout", &escalated_local])
            .await;
        if !log.command("switch worktree to alternate branch", &out).await {
            return outcome;
        }

        let spec = refspec(&escalated_local, &escalated.unique_branch);
        let out = self.runner.run(&wt, &["push", &self.remote, &spec]).await;
        outcome.succeeded = log.command("git push (alternate branch)", &out).await;
        outcome
    }
}

#[async_trait]
impl Committer for LocalVcsCommitter {
    fn kind(&self) -> CommitterKind {
        CommitterKind::LocalVcs
    }

    async fn commit(&self, request: &SubmissionRequest, log: &mut StepLog<'_>) -> CommitOutcome {
        let plan = BranchNamer::plan(request.source_branch(), request.identifier());
        let failed = |plan: BranchPlan| CommitOutcome {
            branch_used: plan.unique_branch,
            succeeded: false,
        };

        let mut worktree =
            match IsolatedWorktree::allocate(&self.repo_root, self.runner.program()) {
                Ok(worktree) => worktree,
                Err(e) => {
                    log.failed(
                        "git worktree add",
                        format!("cannot create worktree directory: {e}"),
                    )
                    .await;
                    return failed(plan);
                }
            };

        let local_branch = worktree.local_branch(&plan.unique_branch);
        let outcome = if self.prepare_branch(request, &local_branch, log).await {
            worktree.adopt_branch(local_branch);
            self.commit_in_worktree(request, &plan, &mut worktree, log)
                .await
        } else {
            failed(plan)
        };

        worktree.release(self.runner.as_ref()).await;
        outcome
    }
}
