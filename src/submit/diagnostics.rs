//! Ordered step log for a submission

use crate::repo::CommandOutput;
use crate::submit::ProgressCallback;
use crate::types::{Step, StepStatus};
use tracing::{info, warn};

/// Append-only step log
///
/// Steps keep execution order. Each one is traced and forwarded to the
/// progress callback as it is recorded.
pub struct StepLog<'a> {
    steps: Vec<Step>,
    progress: &'a dyn ProgressCallback,
}

impl<'a> StepLog<'a> {
    /// Empty log reporting to `progress`
    pub fn new(progress: &'a dyn ProgressCallback) -> Self {
        Self {
            steps: Vec::new(),
            progress,
        }
    }

    /// Append a step; returns whether it counts as succeeded
    pub async fn record(
        &mut self,
        name: &str,
        status: StepStatus,
        output: impl Into<String> + Send,
    ) -> bool {
        let step = Step::new(name, status, output);
        match status {
            StepStatus::Succeeded | StepStatus::Skipped => {
                info!(step = %step.name, ?status, "step recorded");
            }
            StepStatus::Rejected | StepStatus::Failed => {
                warn!(step = %step.name, ?status, output = %step.output, "step recorded");
            }
        }
        self.progress.on_step(&step).await;
        let succeeded = step.succeeded;
        self.steps.push(step);
        succeeded
    }

    /// Append a succeeded step
    pub async fn succeeded(&mut self, name: &str, output: impl Into<String> + Send) -> bool {
        self.record(name, StepStatus::Succeeded, output).await
    }

    /// Append a skipped step
    pub async fn skipped(&mut self, name: &str, output: impl Into<String> + Send) -> bool {
        self.record(name, StepStatus::Skipped, output).await
    }

    /// Append a failed step; always returns false
    pub async fn failed(&mut self, name: &str, output: impl Into<String> + Send) -> bool {
        self.record(name, StepStatus::Failed, output).await
    }

    /// Append a step for a git command, succeeded or failed by exit status
    pub async fn command(&mut self, name: &str, out: &CommandOutput) -> bool {
        let status = if out.succeeded {
            StepStatus::Succeeded
        } else {
            StepStatus::Failed
        };
        self.record(name, status, out.output.clone()).await
    }

    /// Recorded steps in order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// True unless some step failed
    pub fn overall_ok(&self) -> bool {
        !self.steps.iter().any(|s| s.status == StepStatus::Failed)
    }

    /// Consume the log
    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submit::NoopProgress;

    #[tokio::test]
    async fn test_order_preserved() {
        let progress = NoopProgress;
        let mut log = StepLog::new(&progress);
        log.succeeded("one", "").await;
        log.skipped("two", "").await;
        log.record("three", StepStatus::Rejected, "").await;

        let names: Vec<&str> = log.steps().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_rejected_and_skipped_do_not_fail() {
        let progress = NoopProgress;
        let mut log = StepLog::new(&progress);
        log.skipped("commit", "nothing to commit").await;
        log.record("push", StepStatus::Rejected, "non-fast-forward").await;
        log.succeeded("push --force-with-lease", "").await;
        assert!(log.overall_ok());

        log.failed("create PR", "HTTP 422").await;
        assert!(!log.overall_ok());
    }

    #[tokio::test]
    async fn test_command_step_status() {
        let progress = NoopProgress;
        let mut log = StepLog::new(&progress);
        assert!(log.command("ok", &CommandOutput::ok("done")).await);
        assert!(!log.command("bad", &CommandOutput::failed(128, "fatal")).await);

        let steps = log.into_steps();
        assert_eq!(steps[1].status, StepStatus::Failed);
        assert_eq!(steps[1].output, "fatal");
    }
}
