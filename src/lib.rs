//! record-pr - publish structured records as pull requests
//!
//! Takes a validated record, commits it to a uniquely named branch of a remote
//! repository and opens a pull request against the target branch. The server's
//! own checkout is never touched: the local path works in an ephemeral
//! worktree, and when no usable git toolchain is present the same change is
//! made through the GitHub contents API.

pub mod auth;
pub mod branch;
pub mod config;
pub mod error;
pub mod platform;
pub mod repo;
pub mod submit;
pub mod types;

pub use submit::{publish_record, SubmissionOrchestrator};
