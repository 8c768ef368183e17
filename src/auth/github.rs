//! GitHub authentication

use crate::auth::AuthSource;
use crate::error::{Error, Result};
use std::env;
use tokio::process::Command;

/// Environment variables checked for a token, in priority order
pub(crate) const TOKEN_VARS: [&str; 3] = ["SERVICE_GITHUB_TOKEN", "GITHUB_TOKEN", "GH_TOKEN"];

/// GitHub authentication configuration
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
}

/// Find a token through a variable lookup
///
/// Priority: `SERVICE_GITHUB_TOKEN`, `GITHUB_TOKEN`, `GH_TOKEN`. Empty values
/// are ignored.
pub fn token_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<GitHubAuthConfig> {
    TOKEN_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
        .map(|token| GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
        })
}

/// Get GitHub authentication
///
/// Environment variables first, then `gh auth token`.
pub async fn get_github_auth() -> Result<GitHubAuthConfig> {
    if let Some(config) = token_from_lookup(|var| env::var(var).ok()) {
        return Ok(config);
    }

    if let Some(token) = gh_cli_token().await {
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
        });
    }

    Err(Error::Auth(
        "No GitHub authentication found. Set SERVICE_GITHUB_TOKEN or GITHUB_TOKEN, or run `gh auth login`".to_string(),
    ))
}

/// Token from an authenticated `gh` CLI, if available
pub async fn gh_cli_token() -> Option<String> {
    let status = Command::new("gh")
        .args(["auth", "status"])
        .output()
        .await
        .ok()?;

    if !status.status.success() {
        return None;
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Test GitHub authentication against an API base, returning the login
pub async fn test_github_auth(config: &GitHubAuthConfig, api_base: &str) -> Result<String> {
    let octocrab = octocrab::Octocrab::builder()
        .personal_token(config.token.clone())
        .base_uri(api_base)
        .map_err(|e| Error::GitHubApi(e.to_string()))?
        .build()
        .map_err(|e| Error::GitHubApi(e.to_string()))?;

    let user = octocrab
        .current()
        .user()
        .await
        .map_err(|e| Error::Auth(format!("Invalid token: {e}")))?;

    Ok(user.login)
}
