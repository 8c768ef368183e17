//! GitHub REST implementation of [`RemoteApi`]

use crate::config::PublishConfig;
use crate::error::{Error, Result};
use crate::platform::{ApiResponse, NewPullRequest, PutContents, RemoteApi};
use crate::types::RepoLocation;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const API_VERSION: &str = "2022-11-28";

/// GitHub service using reqwest
pub struct GitHubService {
    client: Client,
    api_base: String,
    location: RepoLocation,
}

impl GitHubService {
    /// Create a service for a repository
    ///
    /// Fails with [`Error::Config`] when the token cannot be sent as a header
    /// or the HTTP client cannot be built.
    pub fn new(
        token: &str,
        location: RepoLocation,
        api_base: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers(token)?)
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            location,
        })
    }

    /// Create a service from validated configuration
    pub fn from_config(config: &PublishConfig) -> Result<Self> {
        Self::new(
            &config.token,
            config.location.clone(),
            &config.api_base,
            config.http_timeout,
        )
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{path}",
            self.api_base, self.location.owner, self.location.repo
        )
    }

    fn contents_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        self.repo_url(&format!("/contents/{}", encoded.join("/")))
    }

    async fn send(&self, request: RequestBuilder) -> ApiResponse {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return ApiResponse::transport_error(e.to_string()),
        };
        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => {
                debug!(status, "GitHub API response");
                ApiResponse::new(status, body)
            }
            Err(e) => ApiResponse::transport_error(format!("HTTP {status}, unreadable body: {e}")),
        }
    }
}

/// Classic tokens use the `token` scheme; PATs use `Bearer`
fn authorization_value(token: &str) -> String {
    if token.starts_with("ghp_") || token.starts_with("github_pat_") {
        format!("Bearer {token}")
    } else {
        format!("token {token}")
    }
}

/// `Authorization` header for a token
pub(crate) fn authorization_header(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&authorization_value(token)).map_err(|_| {
        Error::Config("API token contains characters not allowed in an HTTP header".to_string())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

fn default_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization_header(token)?);
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert(USER_AGENT, HeaderValue::from_static("record-pr"));
    headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
    Ok(headers)
}

#[async_trait]
impl RemoteApi for GitHubService {
    async fn get_ref(&self, branch: &str) -> ApiResponse {
        let url = self.repo_url(&format!("/git/ref/heads/{branch}"));
        self.send(self.client.get(url)).await
    }

    async fn create_ref(&self, branch: &str, sha: &str) -> ApiResponse {
        let url = self.repo_url("/git/refs");
        let body = json!({ "ref": format!("refs/heads/{branch}"), "sha": sha });
        self.send(self.client.post(url).json(&body)).await
    }

    async fn get_contents(&self, path: &str, git_ref: &str) -> ApiResponse {
        let url = self.contents_url(path);
        self.send(self.client.get(url).query(&[("ref", git_ref)]))
            .await
    }

    async fn put_contents(&self, path: &str, payload: &PutContents) -> ApiResponse {
        let url = self.contents_url(path);
        self.send(self.client.put(url).json(payload)).await
    }

    async fn create_pull(&self, payload: &NewPullRequest) -> ApiResponse {
        let url = self.repo_url("/pulls");
        self.send(self.client.post(url).json(payload)).await
    }

    fn location(&self) -> &RepoLocation {
        &self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ApiCommitter;
    use mockito::Matcher;

    fn location() -> RepoLocation {
        RepoLocation {
            owner: "acme".to_string(),
            repo: "records".to_string(),
            host: None,
        }
    }

    fn service(base: &str, token: &str) -> GitHubService {
        GitHubService::new(token, location(), base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_authorization_scheme() {
        assert_eq!(authorization_value("ghp_abc"), "Bearer ghp_abc");
        assert_eq!(authorization_value("github_pat_abc"), "Bearer github_pat_abc");
        assert_eq!(authorization_value("abc123"), "token abc123");
    }

    #[test]
    fn test_token_unusable_as_header_is_config_error() {
        for token in ["ghp_abc\ndef", "tok\ren", "bad\u{7f}"] {
            let err = GitHubService::new(token, location(), "http://localhost", Duration::from_secs(5));
            assert!(
                matches!(err, Err(Error::Config(ref msg)) if msg.contains("HTTP header")),
                "expected {token:?} to be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_get_ref_sends_auth_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/records/git/ref/heads/main")
            .match_header("authorization", "Bearer ghp_secret")
            .match_header("x-github-api-version", API_VERSION)
            .with_status(200)
            .with_body(r#"{"object":{"sha":"abc123"}}"#)
            .create_async()
            .await;

        let response = service(&server.url(), "ghp_secret").get_ref("main").await;

        mock.assert_async().await;
        assert!(response.is_success());
        assert!(response.body.contains("abc123"));
    }

    #[tokio::test]
    async fn test_create_ref_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/acme/records/git/refs")
            .match_body(Matcher::Json(serde_json::json!({
                "ref": "refs/heads/dev-widget-7",
                "sha": "abc123"
            })))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        let response = service(&server.url(), "t")
            .create_ref("dev-widget-7", "abc123")
            .await;

        mock.assert_async().await;
        assert_eq!(response.status, Some(201));
    }

    #[tokio::test]
    async fn test_get_contents_uses_ref_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/records/contents/records/widget-7.json")
            .match_query(Matcher::UrlEncoded("ref".into(), "dev-widget-7".into()))
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;

        let response = service(&server.url(), "t")
            .get_contents("records/widget-7.json", "dev-widget-7")
            .await;

        mock.assert_async().await;
        assert!(response.is_not_found());
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_put_contents_omits_missing_sha() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/repos/acme/records/contents/records/w.json")
            .match_body(Matcher::Json(serde_json::json!({
                "message": "add w",
                "content": "e30=",
                "branch": "dev-w",
                "committer": {"name": "automation", "email": "automation@example"}
            })))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        let payload = PutContents {
            message: "add w".to_string(),
            content: "e30=".to_string(),
            branch: "dev-w".to_string(),
            sha: None,
            committer: ApiCommitter {
                name: "automation".to_string(),
                email: "automation@example".to_string(),
            },
        };
        let response = service(&server.url(), "t")
            .put_contents("records/w.json", &payload)
            .await;

        mock.assert_async().await;
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_transport_error_has_no_status() {
        // Nothing listens on port 9 (discard) on test hosts
        let response = service("http://127.0.0.1:9", "t").get_ref("main").await;
        assert_eq!(response.status, None);
        assert!(!response.body.is_empty());
        assert!(!response.is_success());
    }
}
