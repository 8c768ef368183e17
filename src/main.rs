//! record-pr - publish structured records as pull requests
//!
//! CLI binary for submitting a record file to a remote repository.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "record-pr")]
#[command(about = "Publish structured records to a repository as pull requests")]
#[command(version)]
struct Cli {
    /// Path to the local repository (defaults to RECORD_PR_REPO_ROOT or the current directory)
    #[arg(short = 'C', long, global = true)]
    repo_root: Option<PathBuf>,

    /// Never use the local git toolchain
    #[arg(long, global = true)]
    force_api: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a record file as a pull request
    Submit {
        /// JSON file holding the record
        record: PathBuf,

        /// Record identifier (defaults to the record's `id` field)
        #[arg(long)]
        id: Option<String>,

        /// File path template with an `{id}` placeholder
        #[arg(long)]
        path: Option<String>,

        /// Branch the submission branch is cut from
        #[arg(long)]
        source: Option<String>,

        /// Branch the pull request targets
        #[arg(long)]
        target: Option<String>,

        /// Commit message and pull request title
        #[arg(short, long)]
        message: Option<String>,

        /// Print the submission result as JSON
        #[arg(long)]
        json: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Show output of every step
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show whether submissions would use local git or the API
    Probe,

    /// Authentication management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Test authentication
    Test,
    /// Show authentication setup instructions
    Setup,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Submit {
            record,
            id,
            path,
            source,
            target,
            message,
            json,
            yes,
            verbose,
        } => {
            let ok = cli::run_submit(cli::SubmitOptions {
                record,
                id,
                path_template: path,
                source,
                target,
                message,
                repo_root: cli.repo_root,
                force_api: cli.force_api,
                json,
                yes,
                verbose,
            })
            .await?;
            if !ok {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Probe => {
            cli::run_probe(cli.repo_root.as_deref(), cli.force_api).await?;
        }
        Commands::Auth { action } => {
            let action_str = match action {
                AuthAction::Test => "test",
                AuthAction::Setup => "setup",
            };
            cli::run_auth(action_str).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
