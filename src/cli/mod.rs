//! CLI commands
//!
//! Command implementations for the `record-pr` binary.

mod auth;
mod probe;
mod progress;
mod style;
mod submit;

pub use auth::run_auth;
pub use probe::run_probe;
pub use submit::{SubmitOptions, run_submit};

use record_pr::auth::gh_cli_token;
use record_pr::config::PublishSettings;
use std::path::Path;

/// Environment settings with CLI overrides and a `gh` token fallback
async fn load_settings(repo_root: Option<&Path>, force_api: bool) -> PublishSettings {
    let mut settings = PublishSettings::from_env();
    if let Some(root) = repo_root {
        settings.repo_root = Some(root.to_path_buf());
    }
    settings.force_api |= force_api;
    if settings.token.is_none() {
        settings.token = gh_cli_token().await;
    }
    settings
}
