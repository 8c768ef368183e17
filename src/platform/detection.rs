//! Repository location parsing from remote URLs

use crate::error::{Error, Result};
use crate::types::RepoLocation;
use regex::Regex;
use std::sync::LazyLock;

static RE_SSH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:ssh://)?git@[^:/]+[:/](.+?)(?:\.git)?/?$").unwrap());
static RE_HTTPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^/]+/(.+?)(?:\.git)?/?$").unwrap());

/// Parse repository info (owner/repo/host) from a remote URL
pub fn parse_repo_info(url: &str) -> Result<RepoLocation> {
    let url = url.trim();
    let hostname = extract_hostname(url)
        .ok_or_else(|| Error::Parse(format!("cannot find host in remote URL: {url}")))?;

    // SSH format: git@host:owner/repo.git
    // HTTPS format: https://host/owner/repo.git
    let path = RE_SSH
        .captures(url)
        .or_else(|| RE_HTTPS.captures(url))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::Parse(format!("cannot parse remote URL: {url}")))?;

    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    let [.., owner, repo] = parts.as_slice() else {
        return Err(Error::Parse(format!("invalid repo path: {path}")));
    };

    let host = if hostname == "github.com" || hostname == "www.github.com" {
        None
    } else {
        Some(hostname)
    };

    Ok(RepoLocation {
        owner: (*owner).to_string(),
        repo: (*repo).to_string(),
        host,
    })
}

/// API base URL for a repository
///
/// An explicit base wins; enterprise hosts get `/api/v3` appended unless the
/// base already carries it.
pub fn api_base_for(location: &RepoLocation, explicit: Option<&str>) -> String {
    if let Some(base) = explicit {
        let base = base.trim_end_matches('/');
        let host = extract_hostname(base);
        if base.contains("/api/v3") || host.as_deref() == Some("api.github.com") {
            return base.to_string();
        }
        return format!("{base}/api/v3");
    }

    match &location.host {
        None => "https://api.github.com".to_string(),
        Some(host) => format!("https://{host}/api/v3"),
    }
}

fn extract_hostname(url: &str) -> Option<String> {
    // SSH format
    if let Some(rest) = url.strip_prefix("git@") {
        return rest
            .split([':', '/'])
            .next()
            .filter(|h| !h.is_empty())
            .map(ToString::to_string);
    }

    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_github_https() {
        let loc = parse_repo_info("https://github.com/owner/repo.git").unwrap();
        assert_eq!(loc.owner, "owner");
        assert_eq!(loc.repo, "repo");
        assert!(loc.host.is_none());
    }

    #[test]
    fn test_parse_github_ssh() {
        let loc = parse_repo_info("git@github.com:owner/repo.git").unwrap();
        assert_eq!(loc.owner, "owner");
        assert_eq!(loc.repo, "repo");
    }

    #[test]
    fn test_parse_enterprise_host() {
        let loc = parse_repo_info("https://git.corp.example/team/records/").unwrap();
        assert_eq!(loc.owner, "team");
        assert_eq!(loc.repo, "records");
        assert_eq!(loc.host.as_deref(), Some("git.corp.example"));
    }

    #[test]
    fn test_parse_rejects_missing_repo() {
        assert!(parse_repo_info("https://github.com/owner").is_err());
        assert!(parse_repo_info("not a url").is_err());
    }

    #[test]
    fn test_api_base_derivation() {
        let public = parse_repo_info("https://github.com/o/r").unwrap();
        assert_eq!(api_base_for(&public, None), "https://api.github.com");

        let ghe = parse_repo_info("https://ghe.example/o/r").unwrap();
        assert_eq!(api_base_for(&ghe, None), "https://ghe.example/api/v3");

        assert_eq!(
            api_base_for(&ghe, Some("https://ghe.example/")),
            "https://ghe.example/api/v3"
        );
        assert_eq!(
            api_base_for(&ghe, Some("https://ghe.example/api/v3")),
            "https://ghe.example/api/v3"
        );
        assert_eq!(
            api_base_for(&public, Some("https://api.github.com")),
            "https://api.github.com"
        );
    }
}
