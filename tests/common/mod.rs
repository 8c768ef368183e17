//! Shared test utilities

pub mod fixtures;
pub mod mock_git;
pub mod mock_remote;
