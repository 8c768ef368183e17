//! Progress callback trait for interface-agnostic updates
//!
//! This trait allows different interfaces (CLI, web server, etc.) to receive
//! progress updates while a submission runs.

use crate::types::{CommitterKind, PullRequestResult, Step};
use async_trait::async_trait;
use std::fmt;

/// Submission phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Checking for a usable local toolchain
    Probing,
    /// Committing through the selected committer
    Committing(CommitterKind),
    /// Opening the pull request
    Publishing,
    /// Submission finished (successfully or not)
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probing => write!(f, "Probing environment"),
            Self::Committing(CommitterKind::LocalVcs) => write!(f, "Committing with local git"),
            Self::Committing(CommitterKind::RemoteApi) => write!(f, "Committing through the API"),
            Self::Publishing => write!(f, "Opening pull request"),
            Self::Complete => write!(f, "Complete"),
        }
    }
}

/// Progress callback trait
///
/// Implement this trait to receive progress updates during submission.
/// - CLI implementations can print to terminal
/// - Web servers can stream steps to the client
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called after each step is recorded
    async fn on_step(&self, step: &Step);

    /// Called when a pull request is opened
    async fn on_pr_created(&self, pr: &PullRequestResult);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_step(&self, _step: &Step) {}
    async fn on_pr_created(&self, _pr: &PullRequestResult) {}
    async fn on_message(&self, _message: &str) {}
}
