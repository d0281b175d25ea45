//! Combined commit status operations.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::GitHubClient;
use crate::error::ApiError;

/// State of a single commit status or of the combined status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Success,
    Failure,
    Error,
    Pending,
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
            Self::Pending => "pending",
        };
        write!(f, "{}", s)
    }
}

/// Combined status for a commit ref.
///
/// GitHub reports `pending` with `total_count == 0` when no status has
/// been posted for the ref yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedStatus {
    /// Aggregate state across all statuses
    pub state: StatusState,

    /// Commit SHA the status was computed for
    pub sha: String,

    /// Number of statuses reported for the ref
    pub total_count: u64,

    /// Latest status per context
    #[serde(default)]
    pub statuses: Vec<CommitStatus>,
}

/// Individual commit status entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitStatus {
    /// Unique status identifier
    pub id: u64,

    /// Status state
    pub state: StatusState,

    /// Context label (CI system name)
    #[serde(default)]
    pub context: String,

    /// Human readable description
    pub description: Option<String>,

    /// Link to the CI run
    pub target_url: Option<String>,

    /// Creation timestamp
    pub created_at: Option<DateTime<Utc>>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl GitHubClient {
    /// Get the combined status for a ref.
    ///
    /// Calls `GET /repos/{owner}/{repo}/commits/{ref}/status`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for HTTP errors, timeouts, or undecodable responses.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo, git_ref = %git_ref))]
    pub async fn get_combined_status(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> Result<CombinedStatus, ApiError> {
        let url = self.endpoint(&["repos", owner, repo, "commits", git_ref, "status"])?;
        let response = self.get(url).await?;
        let body = response.text().await?;

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
