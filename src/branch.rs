//! Branch naming for submissions
//!
//! Every submission gets `<source>-<identifier>`. If the remote refuses that
//! branch by policy, it is escalated exactly once to
//! `<source>-<identifier>-<unix timestamp>`.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Branch names chosen for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPlan {
    /// Branch the change is pushed to
    pub unique_branch: String,
    /// Deterministic name, before any escalation
    pub base_name: String,
}

/// Derives branch names; the disambiguator never repeats within one namer
#[derive(Debug, Default)]
pub struct BranchNamer {
    last_stamp: AtomicI64,
}

impl BranchNamer {
    /// Create a namer
    pub const fn new() -> Self {
        Self {
            last_stamp: AtomicI64::new(0),
        }
    }

    /// Deterministic plan for a source branch and record identifier
    pub fn plan(source_branch: &str, identifier: &str) -> BranchPlan {
        let name = format!("{source_branch}-{identifier}");
        BranchPlan {
            unique_branch: name.clone(),
            base_name: name,
        }
    }

    /// Escalated plan, only called after the remote rejected `plan`
    ///
    /// The suffix is the wall-clock second, bumped when needed so it is
    /// strictly greater than any suffix this namer issued before.
    pub fn escalate(&self, plan: &BranchPlan) -> BranchPlan {
        let stamp = self.next_stamp(Utc::now().timestamp());
        BranchPlan {
            unique_branch: format!("{}-{stamp}", plan.base_name),
            base_name: plan.base_name.clone(),
        }
    }

    fn next_stamp(&self, now: i64) -> i64 {
        let mut prev = self.last_stamp.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(prev + 1);
            match self.last_stamp.compare_exchange(
                prev,
                candidate,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}
