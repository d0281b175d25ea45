//! [`GitHubLookup`] backed by the REST client in `pr-notifier-github`.

use async_trait::async_trait;
use pr_notifier_github::{client, ApiError, GitHubClient};

use crate::github::{GitHubLookup, OpenPullRequest};
use crate::status::{CombinedStatus, StatusEntry, StatusState};
use crate::{NotifierError, NotifierResult, PullRequestDetails, RepositoryRef};

#[async_trait]
impl GitHubLookup for GitHubClient {
    async fn get_combined_status(
        &self,
        repository: &RepositoryRef,
        git_ref: &str,
    ) -> NotifierResult<CombinedStatus> {
        GitHubClient::get_combined_status(self, &repository.owner, &repository.name, git_ref)
            .await
            .map(convert_combined_status)
            .map_err(|e| lookup_failure("get_combined_status", e))
    }

    async fn list_open_pull_requests(
        &self,
        repository: &RepositoryRef,
    ) -> NotifierResult<Vec<OpenPullRequest>> {
        let pull_requests =
            GitHubClient::list_open_pull_requests(self, &repository.owner, &repository.name)
                .await
                .map_err(|e| lookup_failure("list_open_pull_requests", e))?;

        Ok(pull_requests
            .into_iter()
            .map(convert_pull_request)
            .collect())
    }
}

fn lookup_failure(operation: &str, error: ApiError) -> NotifierError {
    let transient = error.is_transient();
    NotifierError::upstream(operation, error, transient)
}

fn convert_state(state: client::StatusState) -> StatusState {
    match state {
        client::StatusState::Success => StatusState::Success,
        client::StatusState::Failure => StatusState::Failure,
        client::StatusState::Error => StatusState::Error,
        client::StatusState::Pending => StatusState::Pending,
    }
}

fn convert_combined_status(combined: client::CombinedStatus) -> CombinedStatus {
    CombinedStatus {
        total_count: combined.total_count,
        state: convert_state(combined.state),
        statuses: combined
            .statuses
            .into_iter()
            .map(|status| StatusEntry {
                id: status.id,
                state: convert_state(status.state),
                context: status.context,
                updated_at: status.updated_at,
            })
            .collect(),
    }
}

fn convert_pull_request(pr: client::PullRequest) -> OpenPullRequest {
    OpenPullRequest {
        details: PullRequestDetails {
            title: pr.title,
            author: pr.user.login,
            url: pr.html_url,
            body: pr.body,
        },
        head_sha: pr.head.sha,
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
