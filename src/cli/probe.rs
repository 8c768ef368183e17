//! Probe command - show which commit path a submission would take

use crate::cli::load_settings;
use crate::cli::style::{Stylize, check, cross};
use anstream::println;
use record_pr::config::PublishConfig;
use record_pr::error::Result;
use record_pr::submit::SubmissionOrchestrator;
use std::path::Path;

/// Run the probe command
pub async fn run_probe(repo_root: Option<&Path>, force_api: bool) -> Result<()> {
    let settings = load_settings(repo_root, force_api).await;
    let config = PublishConfig::try_from(&settings)?;

    println!(
        "Repository: {}",
        format!("{}/{}", config.location.owner, config.location.repo).accent()
    );
    println!("API base:   {}", config.api_base.muted());
    println!("Local root: {}", config.repo_root.display().muted());
    println!();

    let orchestrator = SubmissionOrchestrator::from_config(config)?;
    let report = orchestrator.probe().await;

    if report.usable {
        println!("{} Local git usable, submissions use an isolated worktree", check());
        if let Some(branch) = &report.current_branch {
            println!("  Checked out: {}", branch.accent());
        }
        if let Some(subject) = &report.head_subject {
            println!("  HEAD:        {}", subject.muted());
        }
    } else {
        println!("{} Local git unusable, submissions use the contents API", cross());
        println!("  {}", report.detail.muted());
    }

    Ok(())
}
