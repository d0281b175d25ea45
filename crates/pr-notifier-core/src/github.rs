//! GitHub lookups consumed by the notifier.

use async_trait::async_trait;

use crate::status::CombinedStatus;
use crate::{NotifierResult, PullRequestDetails, RepositoryRef};

/// An open pull request as seen by the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPullRequest {
    pub details: PullRequestDetails,
    pub head_sha: String,
}

/// Read-only GitHub operations the notifier depends on.
///
/// Implementations report every failure, including timeouts, as
/// [`NotifierError::UpstreamLookupFailure`](crate::NotifierError::UpstreamLookupFailure).
#[async_trait]
pub trait GitHubLookup: Send + Sync {
    /// Get the combined status for a commit ref.
    async fn get_combined_status(
        &self,
        repository: &RepositoryRef,
        git_ref: &str,
    ) -> NotifierResult<CombinedStatus>;

    /// List the repository's open pull requests in GitHub's order.
    async fn list_open_pull_requests(
        &self,
        repository: &RepositoryRef,
    ) -> NotifierResult<Vec<OpenPullRequest>>;
}
