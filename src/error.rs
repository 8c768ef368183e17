//! Error types for record-pr

use thiserror::Error;

/// Errors produced by record-pr
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration (credential, repository location)
    #[error("configuration error: {0}")]
    Config(String),

    /// Record identifier cannot be used in a branch name or file path
    #[error("invalid record identifier '{0}': {1}")]
    InvalidIdentifier(String, String),

    /// Source or target branch is not a safe ref name
    #[error("invalid {0} branch '{1}': {2}")]
    InvalidBranch(&'static str, String, String),

    /// Authentication failure
    #[error("authentication error: {0}")]
    Auth(String),

    /// GitHub API returned an error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Remote URL or response could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Filesystem error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias using the crate error type
pub type Result<T> = std::result::Result<T, Error>;
