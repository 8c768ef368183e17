//! CLI progress callback with styled step output and a spinner

use crate::cli::style::{Stream, Stylize, bang, check, cross, dash, hyperlink_url, spinner_style};
use anstream::{eprintln, println};
use async_trait::async_trait;
use indicatif::ProgressBar;
use record_pr::submit::{Phase, ProgressCallback};
use record_pr::types::{PullRequestResult, Step, StepStatus};
use std::time::Duration;

/// Prints each step as it is recorded, with a spinner for the current phase
pub struct CliProgress {
    spinner: ProgressBar,
    /// Show step output under each step
    pub verbose: bool,
}

impl CliProgress {
    /// Create progress output
    pub fn new(verbose: bool) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner, verbose }
    }

    fn print_step(&self, step: &Step) {
        let output = step.output.trim();
        match step.status {
            StepStatus::Succeeded => println!("  {} {}", check(), step.name),
            StepStatus::Skipped => {
                println!("  {} {} {}", dash(), step.name, "(skipped)".muted());
            }
            StepStatus::Rejected => {
                println!("  {} {} {}", bang(), step.name, "(rejected, retrying)".muted());
            }
            StepStatus::Failed => {
                eprintln!("  {} {}", cross(), step.name.error());
                if !output.is_empty() {
                    for line in output.lines() {
                        eprintln!("      {}", line.muted().for_stderr());
                    }
                }
                return;
            }
        }
        if self.verbose && !output.is_empty() {
            for line in output.lines() {
                println!("      {}", line.muted());
            }
        }
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.spinner.finish_and_clear();
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        if phase == Phase::Complete {
            self.spinner.finish_and_clear();
        } else {
            self.spinner.set_message(format!("{phase}..."));
            self.spinner.suspend(|| println!("{}", phase.to_string().emphasis()));
        }
    }

    async fn on_step(&self, step: &Step) {
        self.spinner.suspend(|| self.print_step(step));
    }

    async fn on_pr_created(&self, pr: &PullRequestResult) {
        let pr_num = format!("#{}", pr.number);
        self.spinner.suspend(|| {
            println!(
                "  {} Opened PR {} ({} → {})",
                check(),
                pr_num.accent(),
                pr.head_ref.accent(),
                pr.base_ref.accent()
            );
            println!("    {}", hyperlink_url(Stream::Stdout, &pr.url));
        });
    }

    async fn on_message(&self, message: &str) {
        self.spinner.suspend(|| println!("{message}"));
    }
}
