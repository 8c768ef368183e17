//! Remote API committer
//!
//! Same change as the local committer, made through the refs and contents
//! endpoints. There is no conflict loop: a rejected write fails the step and
//! the caller may retry the whole submission.

use crate::branch::BranchNamer;
use crate::config::CommitIdentity;
use crate::platform::{ApiCommitter, PutContents, RemoteApi};
use crate::submit::{Committer, StepLog};
use crate::types::{CommitOutcome, CommitterKind, SubmissionRequest};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;
use std::sync::Arc;

const REF_EXISTS: &str = "Reference already exists";

#[derive(Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Deserialize)]
struct GitRef {
    object: Option<RefObject>,
    sha: Option<String>,
}

#[derive(Deserialize)]
struct FileContents {
    sha: String,
}

/// Commits through the hosting service API
pub struct RemoteApiCommitter {
    api: Arc<dyn RemoteApi>,
    identity: CommitIdentity,
}

impl RemoteApiCommitter {
    /// Create a committer using `api`
    pub fn new(api: Arc<dyn RemoteApi>, identity: CommitIdentity) -> Self {
        Self { api, identity }
    }
}

fn parse_ref_sha(body: &str) -> Option<String> {
    let parsed: GitRef = serde_json::from_str(body).ok()?;
    parsed.object.map(|o| o.sha).or(parsed.sha)
}

#[async_trait]
impl Committer for RemoteApiCommitter {
    fn kind(&self) -> CommitterKind {
        CommitterKind::RemoteApi
    }

    async fn commit(&self, request: &SubmissionRequest, log: &mut StepLog<'_>) -> CommitOutcome {
        let branch = BranchNamer::plan(request.source_branch(), request.identifier()).unique_branch;
        let mut outcome = CommitOutcome {
            branch_used: branch.clone(),
            succeeded: false,
        };

        // 1. tip of the target branch
        let response = self.api.get_ref(request.target_branch()).await;
        if !response.is_success() {
            log.failed("get base ref", response.describe()).await;
            return outcome;
        }
        let Some(base_sha) = parse_ref_sha(&response.body) else {
            log.failed("get base ref", format!("no commit sha in response: {}", response.body))
                .await;
            return outcome;
        };
        log.succeeded("get base ref", format!("sha: {base_sha}")).await;

        // 2. branch ref, idempotent
        let response = self.api.create_ref(&branch, &base_sha).await;
        if response.is_success() {
            log.succeeded("create branch ref", response.body).await;
        } else if response.body.contains(REF_EXISTS) {
            log.skipped("create branch ref", response.describe()).await;
        } else {
            log.failed("create branch ref", response.describe()).await;
            return outcome;
        }

        // 3. concurrency token of an existing file
        let response = self.api.get_contents(request.file_path(), &branch).await;
        let existing_sha = if response.is_success() {
            match serde_json::from_str::<FileContents>(&response.body) {
                Ok(file) => {
                    log.succeeded("get existing file sha", format!("sha: {}", file.sha))
                        .await;
                    Some(file.sha)
                }
                Err(e) => {
                    log.failed(
                        "get existing file sha",
                        format!("unexpected contents response ({e}): {}", response.body),
                    )
                    .await;
                    return outcome;
                }
            }
        } else if response.is_not_found() {
            log.skipped("get existing file sha", "file does not exist, will create new")
                .await;
            None
        } else {
            log.failed("get existing file sha", response.describe()).await;
            return outcome;
        };

        // 4. create or update
        let content = match request.serialized_record() {
            Ok(content) => BASE64.encode(content),
            Err(e) => {
                log.failed("commit file (contents API)", e.to_string()).await;
                return outcome;
            }
        };
        let payload = PutContents {
            message: request.commit_message().to_string(),
            content,
            branch: branch.clone(),
            sha: existing_sha,
            committer: ApiCommitter {
                name: self.identity.name.clone(),
                email: self.identity.email.clone(),
            },
        };
        let response = self.api.put_contents(request.file_path(), &payload).await;
        if response.is_success() {
            log.succeeded("commit file (contents API)", response.body).await;
            outcome.succeeded = true;
        } else {
            log.failed("commit file (contents API)", response.describe()).await;
        }
        outcome
    }
}
