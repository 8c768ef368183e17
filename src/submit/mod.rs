//! Submission engine
//!
//! Linear flow for one record:
//! 1. Probe - decide between the local git path and the remote API path
//! 2. Commit - put the record on a unique branch with the chosen committer
//! 3. Publish - open the pull request when the commit landed

mod diagnostics;
mod execute;
mod local;
mod progress;
mod publish;
mod remote;

pub use diagnostics::StepLog;
pub use execute::{SubmissionOrchestrator, publish_record};
pub use local::LocalVcsCommitter;
pub use progress::{NoopProgress, Phase, ProgressCallback};
pub use publish::{PullRequestPublisher, Published};
pub use remote::RemoteApiCommitter;

use crate::types::{CommitOutcome, CommitterKind, SubmissionRequest};
use async_trait::async_trait;

/// One way of getting a record onto a remote branch
///
/// Implementations record every attempted step in `log` and never return
/// errors; recoverable conflicts are resolved internally.
#[async_trait]
pub trait Committer: Send + Sync {
    /// Which variant this is
    fn kind(&self) -> CommitterKind;

    /// Commit and push the record, returning the branch that holds it
    async fn commit(&self, request: &SubmissionRequest, log: &mut StepLog<'_>) -> CommitOutcome;
}
