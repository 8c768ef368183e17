//! Submission orchestration
//!
//! PROBE -> COMMIT -> PUBLISH_PR -> DONE. Always returns a
//! [`SubmissionResult`]; failures show up as steps, never as errors.

use crate::branch::BranchNamer;
use crate::config::{PublishConfig, PublishSettings};
use crate::error::Result;
use crate::platform::{GitHubService, RemoteApi};
use crate::repo::{GitRunner, SystemGit, current_branch, probe_environment};
use crate::submit::{
    Committer, LocalVcsCommitter, Phase, ProgressCallback, PullRequestPublisher,
    RemoteApiCommitter, StepLog,
};
use crate::types::{ProbeReport, SubmissionRequest, SubmissionResult};
use std::sync::Arc;
use tracing::{info, warn};

/// Top-level entry point for submissions
///
/// Holds no per-submission state; one orchestrator can serve many submissions
/// concurrently. Escalated branch names stay unique across all of them.
pub struct SubmissionOrchestrator {
    config: PublishConfig,
    runner: Arc<dyn GitRunner>,
    api: Arc<dyn RemoteApi>,
    namer: Arc<BranchNamer>,
}

impl SubmissionOrchestrator {
    /// Create an orchestrator with explicit collaborators
    pub fn new(config: PublishConfig, runner: Arc<dyn GitRunner>, api: Arc<dyn RemoteApi>) -> Self {
        Self {
            config,
            runner,
            api,
            namer: Arc::new(BranchNamer::new()),
        }
    }

    /// Create an orchestrator using the system `git` and the GitHub API
    pub fn from_config(config: PublishConfig) -> Result<Self> {
        let runner = Arc::new(SystemGit::new(config.git_timeout));
        let api = Arc::new(GitHubService::from_config(&config)?);
        Ok(Self::new(config, runner, api))
    }

    /// Configuration in use
    pub const fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Probe the local toolchain, honoring `force_api`
    pub async fn probe(&self) -> ProbeReport {
        if self.config.force_api {
            return ProbeReport {
                usable: false,
                detail: "local toolchain disabled by configuration".to_string(),
                current_branch: None,
                head_subject: None,
            };
        }
        probe_environment(self.runner.as_ref(), &self.config.repo_root).await
    }

    fn select_committer(&self, environment: &ProbeReport) -> Box<dyn Committer> {
        if environment.usable {
            Box::new(LocalVcsCommitter::new(
                Arc::clone(&self.runner),
                Arc::clone(&self.namer),
                self.config.repo_root.clone(),
                self.config.remote.clone(),
                self.config.identity.clone(),
            ))
        } else {
            Box::new(RemoteApiCommitter::new(
                Arc::clone(&self.api),
                self.config.identity.clone(),
            ))
        }
    }

    /// Run one submission
    pub async fn submit(
        &self,
        request: &SubmissionRequest,
        progress: &dyn ProgressCallback,
    ) -> SubmissionResult {
        let mut log = StepLog::new(progress);

        progress.on_phase(Phase::Probing).await;
        let environment = self.probe().await;

        let committer = self.select_committer(&environment);
        info!(
            record = request.identifier(),
            committer = ?committer.kind(),
            detail = %environment.detail,
            "selected committer"
        );
        progress.on_phase(Phase::Committing(committer.kind())).await;
        let commit = committer.commit(request, &mut log).await;

        if environment.usable {
            self.check_primary_checkout(&environment).await;
        }

        let mut pull_request = None;
        let mut pull_request_raw = None;
        if commit.succeeded {
            progress.on_phase(Phase::Publishing).await;
            let published = PullRequestPublisher::new(Arc::clone(&self.api))
                .open(
                    &commit.branch_used,
                    request.target_branch(),
                    request.commit_message(),
                    &self.config.pr_body,
                    &mut log,
                )
                .await;
            if let Some(pr) = &published.pull_request {
                progress.on_pr_created(pr).await;
            }
            pull_request = published.pull_request;
            pull_request_raw = published.raw;
        }

        progress.on_phase(Phase::Complete).await;

        let overall_ok = log.overall_ok() && commit.succeeded;
        info!(record = request.identifier(), overall_ok, branch = %commit.branch_used, "submission finished");

        SubmissionResult {
            overall_ok,
            steps: log.into_steps(),
            committer: Some(committer.kind()),
            commit: Some(commit),
            pull_request,
            pull_request_raw,
            environment: Some(environment),
            error: None,
        }
    }

    /// The primary checkout must still be on the branch the probe saw
    async fn check_primary_checkout(&self, environment: &ProbeReport) {
        let Some(before) = &environment.current_branch else {
            return;
        };
        let after = current_branch(self.runner.as_ref(), &self.config.repo_root).await;
        if after.as_deref() != Some(before.as_str()) {
            warn!(before = %before, after = ?after, "primary checkout branch changed during submission");
        }
    }
}

/// Validate settings and run one submission with the default collaborators
///
/// Missing credential or repository location yields a result with `error` set
/// and no steps.
pub async fn publish_record(
    settings: &PublishSettings,
    request: &SubmissionRequest,
    progress: &dyn ProgressCallback,
) -> SubmissionResult {
    match PublishConfig::try_from(settings).and_then(SubmissionOrchestrator::from_config) {
        Ok(orchestrator) => orchestrator.submit(request, progress).await,
        Err(e) => {
            warn!(error = %e, "submission rejected before any step");
            SubmissionResult::rejected(&e)
        }
    }
}
