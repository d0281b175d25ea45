// Pull request listing for GitHub API

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::client::pagination::parse_link_header;
use crate::client::GitHubClient;
use crate::error::ApiError;

/// GitHub pull request.
///
/// Only the fields the notifier reads are modelled; everything else in the
/// API response is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// Unique pull request identifier
    pub id: u64,

    /// Pull request number (repository-specific)
    pub number: u64,

    /// Pull request title
    pub title: String,

    /// Pull request body content (Markdown)
    pub body: Option<String>,

    /// Pull request state
    pub state: String, // "open", "closed"

    /// User who created the pull request
    pub user: PullRequestUser,

    /// Head branch information
    pub head: PullRequestBranch,

    /// Pull request URL
    pub html_url: String,
}

/// Author of a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestUser {
    /// User login name
    pub login: String,
}

/// Branch information in a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestBranch {
    /// Branch name
    #[serde(rename = "ref")]
    pub branch_ref: String,

    /// Commit SHA
    pub sha: String,
}

/// Items requested per page when listing pull requests (GitHub's maximum).
const PER_PAGE: u32 = 100;

/// Pages followed before listing stops.
const MAX_PAGES: u32 = 10;

impl GitHubClient {
    /// List open pull requests in a repository.
    ///
    /// Follows `Link: rel="next"` headers until the last page or until
    /// ten pages have been read. Results keep GitHub's ordering.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if any page request fails.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn list_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequest>, ApiError> {
        let mut url = self.endpoint(&["repos", owner, repo, "pulls"])?;
        url.query_pairs_mut()
            .append_pair("state", "open")
            .append_pair("per_page", &PER_PAGE.to_string());

        let mut pull_requests = Vec::new();
        let mut next = Some(url);
        let mut pages = 0;

        while let Some(page_url) = next.take() {
            if pages >= MAX_PAGES {
                warn!(
                    max_pages = MAX_PAGES,
                    "Stopped following pull request pages at the page limit"
                );
                break;
            }

            let response = self.get(page_url).await?;
            let next_link = parse_link_header(
                response
                    .headers()
                    .get("link")
                    .and_then(|v| v.to_str().ok()),
            );

            let body = response.text().await?;
            let page: Vec<PullRequest> = serde_json::from_str(&body)?;
            pull_requests.extend(page);
            pages += 1;

            next = match next_link {
                Some(link) => Some(Url::parse(&link).map_err(|e| ApiError::InvalidRequest {
                    message: format!("Invalid pagination link '{}': {}", link, e),
                })?),
                None => None,
            };
        }

        debug!(
            count = pull_requests.len(),
            pages = pages,
            "Listed open pull requests"
        );

        Ok(pull_requests)
    }
}

#[cfg(test)]
#[path = "pull_request_tests.rs"]
mod tests;
