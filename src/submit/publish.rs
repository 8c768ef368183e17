//! Pull request publisher

use crate::platform::{NewPullRequest, RemoteApi};
use crate::submit::StepLog;
use crate::types::PullRequestResult;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
struct BranchRef {
    #[serde(rename = "ref")]
    ref_field: String,
}

#[derive(Deserialize)]
struct PullResponse {
    html_url: Option<String>,
    url: Option<String>,
    number: u64,
    head: BranchRef,
    base: BranchRef,
}

/// What a publish attempt produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Published {
    /// Parsed pull request
    pub pull_request: Option<PullRequestResult>,
    /// Raw body of a successful response that did not parse
    pub raw: Option<String>,
}

/// Opens pull requests
///
/// Exactly one creation call per submission: retrying could open a duplicate.
pub struct PullRequestPublisher {
    api: Arc<dyn RemoteApi>,
}

impl PullRequestPublisher {
    /// Create a publisher using `api`
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self { api }
    }

    /// Open a pull request from `head` into `base`
    pub async fn open(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
        log: &mut StepLog<'_>,
    ) -> Published {
        let payload = NewPullRequest {
            title: title.to_string(),
            head: head.to_string(),
            base: base.to_string(),
            body: body.to_string(),
            maintainer_can_modify: true,
            draft: false,
        };

        let response = self.api.create_pull(&payload).await;
        if !response.is_success() {
            log.failed("create PR", response.describe()).await;
            return Published::default();
        }

        let parsed = parse_pull(&response.body);
        log.succeeded("create PR", response.body.clone()).await;
        match parsed {
            Some(pr) => Published {
                pull_request: Some(pr),
                raw: None,
            },
            None => Published {
                pull_request: None,
                raw: Some(response.body),
            },
        }
    }
}

fn parse_pull(body: &str) -> Option<PullRequestResult> {
    let pr: PullResponse = serde_json::from_str(body).ok()?;
    Some(PullRequestResult {
        url: pr.html_url.or(pr.url).unwrap_or_default(),
        number: pr.number,
        head_ref: pr.head.ref_field,
        base_ref: pr.base.ref_field,
    })
}
