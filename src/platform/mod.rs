//! Remote repository API
//!
//! The remote path and the pull request publisher talk to the hosting service
//! only through [`RemoteApi`]. Responses are returned raw so the caller can put
//! the body into its step log whether the call succeeded or not.

mod detection;
mod github;

pub use detection::{api_base_for, parse_repo_info};
pub use github::GitHubService;
pub(crate) use github::authorization_header;

use crate::types::RepoLocation;
use async_trait::async_trait;
use serde::Serialize;

/// Raw response of a remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status, `None` when the request never completed
    pub status: Option<u16>,
    /// Response body, or the transport error text
    pub body: String,
}

impl ApiResponse {
    /// Response with a status code
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            body: body.into(),
        }
    }

    /// Request that failed before a response arrived
    pub fn transport_error(message: impl Into<String>) -> Self {
        Self {
            status: None,
            body: message.into(),
        }
    }

    /// 2xx response
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|s| (200..300).contains(&s))
    }

    /// 404 response
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// Body prefixed with the status, for step output
    pub fn describe(&self) -> String {
        match self.status {
            Some(status) => format!("HTTP {status}: {}", self.body),
            None => self.body.clone(),
        }
    }
}

/// Commit author/committer in contents API payloads
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApiCommitter {
    /// Name
    pub name: String,
    /// Email
    pub email: String,
}

/// Create-or-update file payload
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PutContents {
    /// Commit message
    pub message: String,
    /// Base64-encoded file content
    pub content: String,
    /// Branch to commit to
    pub branch: String,
    /// Blob sha of the file being replaced; required when updating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    /// Committer identity
    pub committer: ApiCommitter,
}

/// Pull request creation payload
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Title
    pub title: String,
    /// Head branch
    pub head: String,
    /// Base branch
    pub base: String,
    /// Description
    pub body: String,
    /// Allow maintainers to push to the head branch
    pub maintainer_can_modify: bool,
    /// Open as draft
    pub draft: bool,
}

/// Remote API used by the remote committer and the PR publisher
///
/// Implementations never return errors: transport failures become an
/// [`ApiResponse`] without a status.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Read a branch reference (`GET git/ref/heads/{branch}`)
    async fn get_ref(&self, branch: &str) -> ApiResponse;

    /// Create a branch reference (`POST git/refs`)
    async fn create_ref(&self, branch: &str, sha: &str) -> ApiResponse;

    /// Read a file on a ref (`GET contents/{path}?ref=`)
    async fn get_contents(&self, path: &str, git_ref: &str) -> ApiResponse;

    /// Create or update a file (`PUT contents/{path}`)
    async fn put_contents(&self, path: &str, payload: &PutContents) -> ApiResponse;

    /// Open a pull request (`POST pulls`)
    async fn create_pull(&self, payload: &NewPullRequest) -> ApiResponse;

    /// Repository this service targets
    fn location(&self) -> &RepoLocation;
}
