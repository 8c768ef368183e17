//! Scripted git runner for testing
//!
//! These are test utilities - not all may be used by every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use record_pr::repo::{CommandOutput, GitRunner};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCall {
    pub cwd: PathBuf,
    pub args: Vec<String>,
}

impl GitCall {
    /// Arguments joined by spaces
    pub fn line(&self) -> String {
        self.args.join(" ")
    }
}

/// Git runner answering from scripted responses
///
/// Responses are matched by the longest command-line prefix. Queued responses
/// are consumed once; sticky responses apply every time. Anything unscripted
/// succeeds with empty output.
///
/// Defaults model a clean repository on `main` with a non-empty stage.
pub struct MockGitRunner {
    queued: Mutex<Vec<(String, VecDeque<CommandOutput>)>>,
    sticky: Mutex<Vec<(String, CommandOutput)>>,
    hang_on: Mutex<Option<String>>,
    calls: Mutex<Vec<GitCall>>,
    staged: Mutex<HashMap<String, String>>,
}

impl Default for MockGitRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGitRunner {
    /// Create a runner with default responses
    pub fn new() -> Self {
        let runner = Self {
            queued: Mutex::new(Vec::new()),
            sticky: Mutex::new(Vec::new()),
            hang_on: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            staged: Mutex::new(HashMap::new()),
        };
        runner.always("rev-parse --abbrev-ref HEAD", CommandOutput::ok("main"));
        runner.always("--no-pager log -1", CommandOutput::ok("Initial commit"));
        runner.always("diff --cached --quiet", CommandOutput::failed(1, ""));
        runner
    }

    // === Response scripting ===

    /// Answer every command starting with `prefix` with `output`
    pub fn always(&self, prefix: &str, output: CommandOutput) {
        self.sticky
            .lock()
            .unwrap()
            .push((prefix.to_string(), output));
    }

    /// Answer the next command starting with `prefix` with `output`
    pub fn once(&self, prefix: &str, output: CommandOutput) {
        let mut queued = self.queued.lock().unwrap();
        if let Some((_, queue)) = queued.iter_mut().find(|(p, _)| p == prefix) {
            queue.push_back(output);
        } else {
            queued.push((prefix.to_string(), VecDeque::from([output])));
        }
    }

    /// Never return from commands starting with `prefix`
    pub fn hang_on(&self, prefix: &str) {
        *self.hang_on.lock().unwrap() = Some(prefix.to_string());
    }

    // === Call verification ===

    /// All recorded calls
    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.lock().unwrap().clone()
    }

    /// All recorded command lines
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(GitCall::line).collect()
    }

    /// Whether any command started with `prefix`
    pub fn called(&self, prefix: &str) -> bool {
        self.lines().iter().any(|l| l.starts_with(prefix))
    }

    /// Whether any push targeted `refs/heads/<branch>`
    pub fn pushed_to(&self, branch: &str) -> bool {
        let dst = format!(":refs/heads/{branch}");
        self.lines()
            .iter()
            .any(|l| l.starts_with("push ") && l.ends_with(&dst))
    }

    /// Local branches passed to `git worktree add`, in call order
    pub fn worktree_branches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.args.len() > 3 && c.args[0] == "worktree" && c.args[1] == "add")
            .map(|c| c.args[3].clone())
            .collect()
    }

    /// Directory passed to `git worktree add`
    pub fn worktree_dir(&self) -> Option<PathBuf> {
        self.calls()
            .into_iter()
            .find(|c| c.args.len() > 2 && c.args[0] == "worktree" && c.args[1] == "add")
            .map(|c| PathBuf::from(&c.args[2]))
    }

    /// File content present when `git add -- <path>` ran
    pub fn staged_content(&self, path: &str) -> Option<String> {
        self.staged.lock().unwrap().get(path).cloned()
    }

    fn respond(&self, line: &str) -> CommandOutput {
        {
            let mut queued = self.queued.lock().unwrap();
            let best = queued
                .iter_mut()
                .filter(|(prefix, queue)| line.starts_with(prefix.as_str()) && !queue.is_empty())
                .max_by_key(|(prefix, _)| prefix.len());
            if let Some((_, queue)) = best {
                if let Some(output) = queue.pop_front() {
                    return output;
                }
            }
        }

        self.sticky
            .lock()
            .unwrap()
            .iter()
            .filter(|(prefix, _)| line.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map_or_else(|| CommandOutput::ok(""), |(_, output)| output.clone())
    }
}

#[async_trait]
impl GitRunner for MockGitRunner {
    async fn run(&self, cwd: &Path, args: &[&str]) -> CommandOutput {
        let call = GitCall {
            cwd: cwd.to_path_buf(),
            args: args.iter().map(ToString::to_string).collect(),
        };
        let line = call.line();
        self.calls.lock().unwrap().push(call);

        if args.first() == Some(&"add") {
            if let Some(path) = args.last() {
                if let Ok(content) = std::fs::read_to_string(cwd.join(path)) {
                    self.staged
                        .lock()
                        .unwrap()
                        .insert((*path).to_string(), content);
                }
            }
        }

        let hang = self
            .hang_on
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|prefix| line.starts_with(prefix.as_str()));
        if hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }

        self.respond(&line)
    }
}
