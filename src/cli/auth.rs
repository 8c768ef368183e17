//! Auth command - test and explain authentication

use anstream::println;
use record_pr::auth::{get_github_auth, test_github_auth};
use record_pr::config::PublishSettings;
use record_pr::error::Result;
use record_pr::platform::{api_base_for, parse_repo_info};

/// Run the auth test command
pub async fn run_auth_test() -> Result<()> {
    println!("Testing GitHub authentication...");
    let settings = PublishSettings::from_env();
    let api_base = match settings.repo_url.as_deref() {
        Some(url) => api_base_for(&parse_repo_info(url)?, settings.api_base.as_deref()),
        None => settings
            .api_base
            .clone()
            .unwrap_or_else(|| "https://api.github.com".to_string()),
    };

    let config = get_github_auth().await?;
    let username = test_github_auth(&config, &api_base).await?;
    println!("Authenticated as: {username}");
    println!("Token source: {:?}", config.source);
    println!("API base: {api_base}");
    Ok(())
}

/// Run the auth setup command (show instructions)
pub fn run_auth_setup() {
    println!("GitHub Authentication Setup");
    println!("===========================");
    println!();
    println!("Option 1: Environment variable (services)");
    println!("  Set SERVICE_GITHUB_TOKEN, GITHUB_TOKEN or GH_TOKEN");
    println!();
    println!("Option 2: GitHub CLI");
    println!("  Install: https://cli.github.com/");
    println!("  Run: gh auth login");
    println!();
    println!("Repository:");
    println!("  Set RECORD_PR_REPO_URL to the repository's clone URL");
    println!("  For GitHub Enterprise, set GITHUB_API_BASE if the API is not at https://<host>/api/v3");
}

/// Wrapper for auth commands
pub async fn run_auth(action: &str) -> Result<()> {
    match action {
        "test" => run_auth_test().await,
        "setup" => {
            run_auth_setup();
            Ok(())
        }
        _ => {
            println!("Unknown action: {action}. Use 'test' or 'setup'.");
            Ok(())
        }
    }
}
