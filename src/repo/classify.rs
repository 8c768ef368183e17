//! Push failure classification

/// Why a push failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushFailure {
    /// Remote has commits the local branch lacks
    NonFastForward,
    /// Server-side policy refused the update (protected branch, hook)
    PolicyRejected,
    /// Anything else: auth, network, missing remote
    Other,
}

impl PushFailure {
    /// Whether the conditional-force resolution applies
    pub const fn is_conflict(self) -> bool {
        matches!(self, Self::NonFastForward | Self::PolicyRejected)
    }
}

const POLICY_MARKERS: [&str; 4] = [
    "pre-receive hook declined",
    "force-pushing",
    "protected branch",
    "gh006",
];

const NON_FAST_FORWARD_MARKERS: [&str; 4] = [
    "non-fast-forward",
    "fetch first",
    "stale info",
    "failed to push some refs",
];

/// Classify push output; policy markers take precedence
pub fn classify_push_failure(output: &str) -> PushFailure {
    let lower = output.to_lowercase();
    if POLICY_MARKERS.iter().any(|m| lower.contains(m)) {
        PushFailure::PolicyRejected
    } else if NON_FAST_FORWARD_MARKERS.iter().any(|m| lower.contains(m)) {
        PushFailure::NonFastForward
    } else {
        PushFailure::Other
    }
}
