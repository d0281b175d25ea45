//! GitHub API client for token-authenticated operations.
//!
//! This module provides the `GitHubClient` used by the notifier to read the
//! combined commit status of a ref and to list open pull requests. Requests
//! are authenticated with a single OAuth or personal access token and bounded
//! by the configured timeout.

mod pagination;
mod pull_request;
mod status;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{header::HeaderMap, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::ApiError;

pub use pull_request::{PullRequest, PullRequestBranch, PullRequestUser};
pub use status::{CombinedStatus, CommitStatus, StatusState};

/// Configuration for GitHub API client behavior.
///
/// Controls the timeout and the API endpoint. The path prefix
/// supports GitHub Enterprise installations that serve the API below a
/// sub-path such as `/api/v3`.
///
/// # Examples
///
/// ```
/// use pr_notifier_github::client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(5))
///     .with_github_api_url("https://github.example.com")
///     .with_path_prefix("/api/v3");
///
/// assert_eq!(config.base_url(), "https://github.example.com/api/v3");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string for API requests (required by GitHub)
    pub user_agent: String,
    /// Request timeout duration
    pub timeout: Duration,
    /// GitHub API base URL
    pub github_api_url: String,
    /// Optional path prefix appended to the base URL
    pub path_prefix: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("pr-notifier/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_millis(5000),
            github_api_url: "https://api.github.com".to_string(),
            path_prefix: None,
        }
    }
}

impl ClientConfig {
    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the GitHub API base URL.
    pub fn with_github_api_url(mut self, url: impl Into<String>) -> Self {
        self.github_api_url = url.into();
        self
    }

    /// Set the API path prefix (GitHub Enterprise).
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.path_prefix = if prefix.trim().is_empty() {
            None
        } else {
            Some(prefix)
        };
        self
    }

    /// Base URL with the path prefix applied and no trailing slash.
    pub fn base_url(&self) -> String {
        let host = self.github_api_url.trim_end_matches('/');
        match &self.path_prefix {
            Some(prefix) => format!("{}/{}", host, prefix.trim_matches('/')),
            None => host.to_string(),
        }
    }
}

/// GitHub API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct GitHubClient {
    token: String,
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("token", &"<REDACTED>")
            .field("config", &self.config)
            .finish()
    }
}

impl GitHubClient {
    /// Create a new client authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the HTTP client cannot be built
    /// or the configured base URL is not a valid URL.
    pub fn new(token: impl Into<String>, config: ClientConfig) -> Result<Self, ApiError> {
        Url::parse(&config.base_url()).map_err(|e| ApiError::InvalidRequest {
            message: format!("Invalid GitHub API URL '{}': {}", config.base_url(), e),
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::InvalidRequest {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            token: token.into(),
            http_client,
            config,
        })
    }

    /// Build an API URL from path segments, percent-encoding each segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.config.base_url()).map_err(|e| ApiError::InvalidRequest {
            message: format!("Invalid GitHub API URL: {}", e),
        })?;

        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest {
                message: "GitHub API URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Make an authenticated GET request and map error statuses to `ApiError`.
    pub(crate) async fn get(&self, url: Url) -> Result<reqwest::Response, ApiError> {
        debug!(url = %url, "GitHub API request");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await?;

        check_status(response).await
    }
}

/// Convert a non-success response into the matching `ApiError`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(ApiError::AuthenticationFailed),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
            if rate_limit_exhausted(response.headers()) =>
        {
            Err(ApiError::RateLimitExceeded {
                reset_at: rate_limit_reset(response.headers()),
            })
        }
        StatusCode::FORBIDDEN => Err(ApiError::AuthorizationFailed),
        _ => {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            Err(ApiError::HttpError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn rate_limit_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false)
}

fn rate_limit_reset(headers: &HeaderMap) -> DateTime<Utc> {
    headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
