//! Core types for record-pr

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque record payload (a JSON object)
pub type RecordPayload = Map<String, Value>;

/// A single record change to publish
///
/// Immutable once constructed; the identifier has already been checked to be
/// usable as a branch name component.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    identifier: String,
    payload: RecordPayload,
    file_path: String,
    source_branch: String,
    target_branch: String,
    commit_message: String,
}

impl SubmissionRequest {
    /// Build a request, deriving the file path from `path_template`
    ///
    /// `path_template` contains an `{id}` placeholder. When `commit_message` is
    /// `None` a message is derived from the record's `title` field.
    pub fn new(
        identifier: &str,
        payload: RecordPayload,
        path_template: &str,
        source_branch: &str,
        target_branch: &str,
        commit_message: Option<String>,
    ) -> Result<Self> {
        validate_identifier(identifier)?;
        validate_branch("source", source_branch)?;
        validate_branch("target", target_branch)?;
        let file_path = record_path(path_template, identifier)?;
        let commit_message =
            commit_message.unwrap_or_else(|| default_commit_message(identifier, &payload));

        Ok(Self {
            identifier: identifier.to_string(),
            payload,
            file_path,
            source_branch: source_branch.to_string(),
            target_branch: target_branch.to_string(),
            commit_message,
        })
    }

    /// Record identifier
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Record payload
    pub const fn payload(&self) -> &RecordPayload {
        &self.payload
    }

    /// Repository-relative path the record is written to
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Branch the unique branch is cut from (local path)
    pub fn source_branch(&self) -> &str {
        &self.source_branch
    }

    /// Branch the pull request targets
    pub fn target_branch(&self) -> &str {
        &self.target_branch
    }

    /// Commit message, also used as the pull request title
    pub fn commit_message(&self) -> &str {
        &self.commit_message
    }

    /// Serialized file content (pretty JSON, two-space indent)
    pub fn serialized_record(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.payload)?)
    }
}

fn default_commit_message(identifier: &str, payload: &RecordPayload) -> String {
    let title = payload
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default();
    format!("chore: add record {title} ({identifier})")
}

/// Check that an identifier is a safe single ref component
fn validate_identifier(identifier: &str) -> Result<()> {
    let problem = if identifier.contains('/') {
        Some("contains forbidden character '/'".to_string())
    } else {
        ref_name_problem(identifier)
    };
    problem.map_or(Ok(()), |reason| {
        Err(Error::InvalidIdentifier(identifier.to_string(), reason))
    })
}

/// Check that a branch name is a plain ref name git cannot read as an option
fn validate_branch(kind: &'static str, branch: &str) -> Result<()> {
    ref_name_problem(branch).map_or(Ok(()), |reason| {
        Err(Error::InvalidBranch(kind, branch.to_string(), reason))
    })
}

fn ref_name_problem(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("empty".to_string());
    }
    if name.starts_with('-') {
        return Some("must not start with '-'".to_string());
    }
    if name.starts_with('/') || name.ends_with(['.', '/']) || name.contains("//") {
        return Some("must not start with '/', end with '.' or '/', or contain '//'".to_string());
    }
    if name.contains("..") || name.contains("@{") || name.ends_with(".lock") {
        return Some("contains '..' or '@{', or ends with '.lock'".to_string());
    }
    if name.split('/').any(|part| part.starts_with('.')) {
        return Some("a path component starts with '.'".to_string());
    }
    name.chars()
        .find(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(*c))
        .map(|c| format!("contains forbidden character {c:?}"))
}

/// Expand a path template for an identifier
pub fn record_path(template: &str, identifier: &str) -> Result<String> {
    if !template.contains("{id}") {
        return Err(Error::Config(format!(
            "path template '{template}' has no {{id}} placeholder"
        )));
    }
    let path = template.replace("{id}", identifier);
    if path.starts_with('/') || path.split('/').any(|part| part == "..") {
        return Err(Error::Config(format!(
            "record path '{path}' must be relative to the repository root"
        )));
    }
    Ok(path)
}

/// Outcome of a single recorded step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step ran and succeeded
    Succeeded,
    /// Nothing needed doing (empty diff, existing ref, absent file)
    Skipped,
    /// Push rejected with a recognized conflict pattern that a later step resolves
    Rejected,
    /// Step failed; the committer stopped here
    Failed,
}

/// An append-only record of one attempted step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Human-readable step name
    pub name: String,
    /// Whether the step succeeded (true for skipped steps)
    pub succeeded: bool,
    /// Detailed status
    pub status: StepStatus,
    /// Captured command output or response body
    pub output: String,
    /// When the step was recorded
    pub at: DateTime<Utc>,
}

impl Step {
    /// Create a step with the given status
    pub fn new(name: impl Into<String>, status: StepStatus, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            succeeded: matches!(status, StepStatus::Succeeded | StepStatus::Skipped),
            status,
            output: output.into(),
            at: Utc::now(),
        }
    }
}

/// Which committer executed the change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitterKind {
    /// Local git toolchain in an isolated worktree
    LocalVcs,
    /// GitHub refs + contents API
    RemoteApi,
}

/// Result of a committer run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    /// Branch that holds the change (after any escalation)
    pub branch_used: String,
    /// Whether the change reached the remote
    pub succeeded: bool,
}

/// A pull request opened by the publisher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestResult {
    /// Web URL for the PR
    pub url: String,
    /// PR number
    pub number: u64,
    /// Head branch name
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
}

/// Environment probe result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Whether the local toolchain path can be used
    pub usable: bool,
    /// Probe command output or reason for unusability
    pub detail: String,
    /// Branch checked out in the primary repository, if readable
    pub current_branch: Option<String>,
    /// Subject line of the primary checkout's HEAD commit, if readable
    pub head_subject: Option<String>,
}

/// Everything the caller gets back from a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResult {
    /// False if any step failed, the commit did not land, or configuration was missing
    pub overall_ok: bool,
    /// Ordered step log
    pub steps: Vec<Step>,
    /// Committer that ran, if any
    pub committer: Option<CommitterKind>,
    /// Commit outcome, if a committer ran
    pub commit: Option<CommitOutcome>,
    /// Opened pull request, if creation succeeded and the response parsed
    pub pull_request: Option<PullRequestResult>,
    /// Raw PR creation response when it could not be parsed
    pub pull_request_raw: Option<String>,
    /// Environment probe report
    pub environment: Option<ProbeReport>,
    /// Fatal error that prevented any step from running
    pub error: Option<String>,
}

impl SubmissionResult {
    /// Result for a submission rejected before any step ran
    pub fn rejected(error: &Error) -> Self {
        Self {
            overall_ok: false,
            steps: Vec::new(),
            committer: None,
            commit: None,
            pull_request: None,
            pull_request_raw: None,
            environment: None,
            error: Some(error.to_string()),
        }
    }
}

/// Remote repository location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}
