//! Publishing configuration
//!
//! Settings come from environment variables. [`PublishSettings`] holds the raw
//! values; [`PublishConfig`] is the validated form every submission runs with.

use crate::auth::token_from_lookup;
use crate::error::{Error, Result};
use crate::platform::{api_base_for, authorization_header, parse_repo_info};
use crate::types::RepoLocation;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default file path convention
pub const DEFAULT_PATH_TEMPLATE: &str = "records/{id}.json";

/// Default pull request body
pub const DEFAULT_PR_BODY: &str = "Automated submission. Please review and merge.";

const DEFAULT_GIT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

/// Identity used for commits made by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    /// Committer name
    pub name: String,
    /// Committer email
    pub email: String,
}

impl Default for CommitIdentity {
    fn default() -> Self {
        Self {
            name: "automation".to_string(),
            email: "automation@example".to_string(),
        }
    }
}

/// Raw settings, every value optional
#[derive(Debug, Clone, Default)]
pub struct PublishSettings {
    /// Remote repository URL
    pub repo_url: Option<String>,
    /// API credential
    pub token: Option<String>,
    /// Explicit API base URL
    pub api_base: Option<String>,
    /// Local repository root
    pub repo_root: Option<PathBuf>,
    /// Git remote name
    pub remote: Option<String>,
    /// Default source branch
    pub source_branch: Option<String>,
    /// Default target branch
    pub target_branch: Option<String>,
    /// File path convention
    pub path_template: Option<String>,
    /// Skip the local toolchain path
    pub force_api: bool,
    /// Git command timeout in seconds
    pub git_timeout_secs: Option<u64>,
    /// HTTP request timeout in seconds
    pub http_timeout_secs: Option<u64>,
}

impl PublishSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };
        let secs = |key: &str| first(&[key]).and_then(|value| value.parse().ok());

        Self {
            repo_url: first(&["RECORD_PR_REPO_URL", "AUTON_REPO_URL"]),
            token: token_from_lookup(&lookup).map(|auth| auth.token),
            api_base: first(&["GITHUB_API_BASE"]),
            repo_root: first(&["RECORD_PR_REPO_ROOT"]).map(PathBuf::from),
            remote: first(&["RECORD_PR_REMOTE"]),
            source_branch: first(&["RECORD_PR_SOURCE_BRANCH", "AUTON_SOURCE_BRANCH"]),
            target_branch: first(&["RECORD_PR_TARGET_BRANCH", "AUTON_TARGET_BRANCH"]),
            path_template: first(&["RECORD_PR_PATH_TEMPLATE"]),
            force_api: first(&["RECORD_PR_FORCE_API"])
                .is_some_and(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes")),
            git_timeout_secs: secs("RECORD_PR_GIT_TIMEOUT_SECS"),
            http_timeout_secs: secs("RECORD_PR_HTTP_TIMEOUT_SECS"),
        }
    }
}

/// Validated configuration
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Remote repository
    pub location: RepoLocation,
    /// API base URL, without trailing slash
    pub api_base: String,
    /// API credential
    pub token: String,
    /// Local repository root (primary checkout)
    pub repo_root: PathBuf,
    /// Git remote name
    pub remote: String,
    /// Default source branch
    pub source_branch: String,
    /// Default target branch
    pub target_branch: String,
    /// File path convention
    pub path_template: String,
    /// Pull request body
    pub pr_body: String,
    /// Identity for commits
    pub identity: CommitIdentity,
    /// Skip the local toolchain path
    pub force_api: bool,
    /// Git command timeout
    pub git_timeout: Duration,
    /// HTTP request timeout
    pub http_timeout: Duration,
}

impl TryFrom<&PublishSettings> for PublishConfig {
    type Error = Error;

    fn try_from(settings: &PublishSettings) -> Result<Self> {
        let repo_url = settings
            .repo_url
            .as_deref()
            .ok_or_else(|| Error::Config("RECORD_PR_REPO_URL not configured".to_string()))?;
        let token = settings.token.clone().ok_or_else(|| {
            Error::Config("SERVICE_GITHUB_TOKEN/GITHUB_TOKEN not configured".to_string())
        })?;
        authorization_header(&token)?;
        let location = parse_repo_info(repo_url)?;
        let api_base = api_base_for(&location, settings.api_base.as_deref());

        let remote = settings.remote.clone().unwrap_or_else(|| "origin".to_string());
        if remote.is_empty() || remote.starts_with('-') {
            return Err(Error::Config(format!("invalid git remote name '{remote}'")));
        }

        let repo_root = match &settings.repo_root {
            Some(root) => root.clone(),
            None => env::current_dir()?,
        };

        Ok(Self {
            location,
            api_base,
            token,
            repo_root,
            remote,
            source_branch: settings.source_branch.clone().unwrap_or_else(|| "main".to_string()),
            target_branch: settings.target_branch.clone().unwrap_or_else(|| "main".to_string()),
            path_template: settings
                .path_template
                .clone()
                .unwrap_or_else(|| DEFAULT_PATH_TEMPLATE.to_string()),
            pr_body: DEFAULT_PR_BODY.to_string(),
            identity: CommitIdentity::default(),
            force_api: settings.force_api,
            git_timeout: Duration::from_secs(
                settings.git_timeout_secs.unwrap_or(DEFAULT_GIT_TIMEOUT_SECS),
            ),
            http_timeout: Duration::from_secs(
                settings.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
        })
    }
}
