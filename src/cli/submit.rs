//! Submit command - publish a record file as a pull request

use crate::cli::load_settings;
use crate::cli::progress::CliProgress;
use crate::cli::style::{Stylize, check, cross};
use anstream::{eprintln, println};
use dialoguer::Confirm;
use record_pr::branch::BranchNamer;
use record_pr::config::PublishConfig;
use record_pr::error::{Error, Result};
use record_pr::submit::{NoopProgress, ProgressCallback, SubmissionOrchestrator};
use record_pr::types::{RecordPayload, SubmissionRequest, SubmissionResult};
use serde_json::Value;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Options for the submit command
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    /// JSON file holding the record
    pub record: PathBuf,
    /// Record identifier; defaults to the record's `id` field
    pub id: Option<String>,
    /// Path template override
    pub path_template: Option<String>,
    /// Source branch override
    pub source: Option<String>,
    /// Target branch override
    pub target: Option<String>,
    /// Commit message / PR title
    pub message: Option<String>,
    /// Local repository root override
    pub repo_root: Option<PathBuf>,
    /// Skip the local git path
    pub force_api: bool,
    /// Print the result as JSON
    pub json: bool,
    /// Do not ask for confirmation
    pub yes: bool,
    /// Show step output
    pub verbose: bool,
}

fn read_record(path: &Path) -> Result<RecordPayload> {
    let text = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::Parse(format!(
            "{} must contain a JSON object",
            path.display()
        ))),
    }
}

/// Run the submit command; returns whether the submission fully succeeded
pub async fn run_submit(options: SubmitOptions) -> Result<bool> {
    let payload = read_record(&options.record)?;
    let identifier = options
        .id
        .clone()
        .or_else(|| payload.get("id").and_then(Value::as_str).map(ToString::to_string))
        .ok_or_else(|| Error::Parse("record has no `id` field; pass --id".to_string()))?;

    let settings = load_settings(options.repo_root.as_deref(), options.force_api).await;
    let config = PublishConfig::try_from(&settings)?;

    let request = SubmissionRequest::new(
        &identifier,
        payload,
        options.path_template.as_deref().unwrap_or(&config.path_template),
        options.source.as_deref().unwrap_or(&config.source_branch),
        options.target.as_deref().unwrap_or(&config.target_branch),
        options.message.clone(),
    )?;

    if !options.json {
        let branch = BranchNamer::plan(request.source_branch(), request.identifier()).unique_branch;
        println!(
            "Publishing {} to {} as {} → {}",
            request.identifier().accent(),
            format!("{}/{}", config.location.owner, config.location.repo).accent(),
            branch.accent(),
            request.target_branch().accent()
        );
        println!("  {}", request.file_path().muted());
        println!();

        if !options.yes && std::io::stdin().is_terminal() {
            let proceed = Confirm::new()
                .with_prompt("Open pull request?")
                .default(true)
                .interact()
                .map_err(|e| Error::Io(std::io::Error::other(e)))?;
            if !proceed {
                println!("{}", "Aborted".muted());
                return Ok(false);
            }
        }
    }

    let orchestrator = SubmissionOrchestrator::from_config(config)?;
    let result = if options.json {
        orchestrator.submit(&request, &NoopProgress).await
    } else {
        let progress = CliProgress::new(options.verbose);
        let result = orchestrator.submit(&request, &progress).await;
        progress.on_message("").await;
        result
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    Ok(result.overall_ok)
}

fn print_summary(result: &SubmissionResult) {
    if result.overall_ok {
        let number = result
            .pull_request
            .as_ref()
            .map_or_else(String::new, |pr| format!(" #{}", pr.number));
        println!("{} Submitted{}", check(), number.accent());
        if let Some(raw) = &result.pull_request_raw {
            println!("  Unparsed PR response: {}", raw.muted());
        }
        return;
    }

    eprintln!("{} Submission failed", cross());
    if let Some(commit) = result.commit.as_ref().filter(|c| c.succeeded) {
        eprintln!(
            "  Branch {} was pushed; open the pull request manually",
            commit.branch_used.warn()
        );
    }
    if let Some(error) = &result.error {
        eprintln!("  {}", error.error());
    }
}
