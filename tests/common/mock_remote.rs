//! Mock remote API for testing
//!
//! These are test utilities - not all may be used by every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use record_pr::platform::{ApiResponse, NewPullRequest, PutContents, RemoteApi};
use record_pr::types::RepoLocation;
use serde_json::json;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_ref`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRefCall {
    pub branch: String,
    pub sha: String,
}

/// Simple mock remote API
///
/// Features:
/// - Auto-incrementing PR numbers
/// - Call tracking for verification
/// - Response injection per endpoint
pub struct MockRemoteApi {
    location: RepoLocation,
    next_pr_number: AtomicU64,
    get_ref_response: Mutex<ApiResponse>,
    create_ref_response: Mutex<ApiResponse>,
    get_contents_response: Mutex<ApiResponse>,
    put_contents_response: Mutex<ApiResponse>,
    create_pull_response: Mutex<Option<ApiResponse>>,
    // Call tracking
    calls: Mutex<Vec<String>>,
    create_ref_calls: Mutex<Vec<CreateRefCall>>,
    put_contents_calls: Mutex<Vec<(String, PutContents)>>,
    create_pull_calls: Mutex<Vec<NewPullRequest>>,
}

impl MockRemoteApi {
    /// Mock where every call succeeds and the file does not exist yet
    pub fn new(location: RepoLocation) -> Self {
        Self {
            location,
            next_pr_number: AtomicU64::new(1),
            get_ref_response: Mutex::new(ApiResponse::new(
                200,
                r#"{"ref":"refs/heads/main","object":{"sha":"base123","type":"commit"}}"#,
            )),
            create_ref_response: Mutex::new(ApiResponse::new(201, r#"{"ref":"created"}"#)),
            get_contents_response: Mutex::new(ApiResponse::new(404, r#"{"message":"Not Found"}"#)),
            put_contents_response: Mutex::new(ApiResponse::new(201, r#"{"content":{}}"#)),
            create_pull_response: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            create_ref_calls: Mutex::new(Vec::new()),
            put_contents_calls: Mutex::new(Vec::new()),
            create_pull_calls: Mutex::new(Vec::new()),
        }
    }

    // === Response injection ===

    pub fn set_get_ref(&self, response: ApiResponse) {
        *self.get_ref_response.lock().unwrap() = response;
    }

    pub fn set_create_ref(&self, response: ApiResponse) {
        *self.create_ref_response.lock().unwrap() = response;
    }

    pub fn set_get_contents(&self, response: ApiResponse) {
        *self.get_contents_response.lock().unwrap() = response;
    }

    pub fn set_put_contents(&self, response: ApiResponse) {
        *self.put_contents_response.lock().unwrap() = response;
    }

    /// Override the generated PR response
    pub fn set_create_pull(&self, response: ApiResponse) {
        *self.create_pull_response.lock().unwrap() = Some(response);
    }

    // === Call verification ===

    /// Endpoint names in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_ref_calls(&self) -> Vec<CreateRefCall> {
        self.create_ref_calls.lock().unwrap().clone()
    }

    pub fn put_contents_calls(&self) -> Vec<(String, PutContents)> {
        self.put_contents_calls.lock().unwrap().clone()
    }

    pub fn create_pull_calls(&self) -> Vec<NewPullRequest> {
        self.create_pull_calls.lock().unwrap().clone()
    }

    /// Assert that a PR was requested from `head` into `base`
    pub fn assert_pull_requested(&self, head: &str, base: &str) {
        let calls = self.create_pull_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pull({head}, {base}) but got: {calls:?}"
        );
    }

    fn track(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl RemoteApi for MockRemoteApi {
    async fn get_ref(&self, _branch: &str) -> ApiResponse {
        self.track("get_ref");
        self.get_ref_response.lock().unwrap().clone()
    }

    async fn create_ref(&self, branch: &str, sha: &str) -> ApiResponse {
        self.track("create_ref");
        self.create_ref_calls.lock().unwrap().push(CreateRefCall {
            branch: branch.to_string(),
            sha: sha.to_string(),
        });
        self.create_ref_response.lock().unwrap().clone()
    }

    async fn get_contents(&self, _path: &str, _git_ref: &str) -> ApiResponse {
        self.track("get_contents");
        self.get_contents_response.lock().unwrap().clone()
    }

    async fn put_contents(&self, path: &str, payload: &PutContents) -> ApiResponse {
        self.track("put_contents");
        self.put_contents_calls
            .lock()
            .unwrap()
            .push((path.to_string(), payload.clone()));
        self.put_contents_response.lock().unwrap().clone()
    }

    async fn create_pull(&self, payload: &NewPullRequest) -> ApiResponse {
        self.track("create_pull");
        self.create_pull_calls.lock().unwrap().push(payload.clone());

        if let Some(response) = self.create_pull_response.lock().unwrap().clone() {
            return response;
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let body = json!({
            "url": format!("https://api.github.com/repos/acme/records/pulls/{number}"),
            "html_url": format!("https://github.com/acme/records/pull/{number}"),
            "number": number,
            "head": { "ref": payload.head },
            "base": { "ref": payload.base },
        });
        ApiResponse::new(201, body.to_string())
    }

    fn location(&self) -> &RepoLocation {
        &self.location
    }
}
