//! Test data factories for record-pr types
//!
//! These are test utilities - not all may be used by every test binary.

#![allow(dead_code)]

use record_pr::config::{CommitIdentity, DEFAULT_PATH_TEMPLATE, DEFAULT_PR_BODY, PublishConfig};
use record_pr::types::{RecordPayload, RepoLocation, Step, StepStatus, SubmissionRequest};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Repository root that passes the `.git` presence check
pub fn git_repo_root() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();
    dir
}

/// Directory with no `.git`
pub fn plain_root() -> TempDir {
    TempDir::new().unwrap()
}

/// Repository location used by all fixtures
pub fn location() -> RepoLocation {
    RepoLocation {
        owner: "acme".to_string(),
        repo: "records".to_string(),
        host: None,
    }
}

/// Validated config pointing at `repo_root`
pub fn make_config(repo_root: &Path) -> PublishConfig {
    PublishConfig {
        location: location(),
        api_base: "https://api.github.com".to_string(),
        token: "test-token".to_string(),
        repo_root: repo_root.to_path_buf(),
        remote: "origin".to_string(),
        source_branch: "dev".to_string(),
        target_branch: "main".to_string(),
        path_template: DEFAULT_PATH_TEMPLATE.to_string(),
        pr_body: DEFAULT_PR_BODY.to_string(),
        identity: CommitIdentity::default(),
        force_api: false,
        git_timeout: Duration::from_secs(5),
        http_timeout: Duration::from_secs(5),
    }
}

/// Record payload with a title
pub fn make_payload(title: &str) -> RecordPayload {
    json!({ "title": title, "owner": "ops", "tools": 3 })
        .as_object()
        .cloned()
        .unwrap()
}

/// Request for `identifier` from `dev` into `main`
pub fn make_request(identifier: &str) -> SubmissionRequest {
    SubmissionRequest::new(
        identifier,
        make_payload("Widget"),
        DEFAULT_PATH_TEMPLATE,
        "dev",
        "main",
        None,
    )
    .unwrap()
}

/// Step names in order
pub fn step_names(steps: &[Step]) -> Vec<&str> {
    steps.iter().map(|s| s.name.as_str()).collect()
}

/// Status of the step named `name` (first match)
pub fn status_of(steps: &[Step], name: &str) -> Option<StepStatus> {
    steps.iter().find(|s| s.name == name).map(|s| s.status)
}
