//! # PR Notifier GitHub Client
//!
//! Thin GitHub REST client used by the pull request notifier.
//!
//! This crate provides:
//! - Token (OAuth / personal access token) authenticated requests
//! - Combined commit status lookups
//! - Open pull request listing with `Link` header pagination
//! - Error classification for logging and diagnostics
//!
//! # Examples
//!
//! ```rust,no_run
//! use pr_notifier_github::client::{ClientConfig, GitHubClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), pr_notifier_github::ApiError> {
//! let config = ClientConfig::default().with_timeout(Duration::from_millis(5000));
//! let client = GitHubClient::new("ghp_example", config)?;
//!
//! let status = client.get_combined_status("octocat", "hello-world", "abc123").await?;
//! println!("{} checks, state {}", status.total_count, status.state);
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod client;
pub mod error;

// Re-export commonly used types at crate root for convenience
pub use client::{
    ClientConfig, CombinedStatus, CommitStatus, GitHubClient, PullRequest, PullRequestBranch,
    PullRequestUser, StatusState,
};
pub use error::ApiError;
