//! # Webhook Event Classification
//!
//! Turns a raw webhook delivery (the `x-github-event` header value plus the
//! JSON payload) into the parameters the notifier needs: which commit to
//! evaluate, which status delivery triggered the request, and which pull
//! request to announce.
//!
//! Fields are read straight from the `serde_json::Value` so that missing
//! fields can be reported by their dotted path.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::github::GitHubLookup;
use crate::status::OriginStatus;
use crate::{NotifierError, NotifierResult, PullRequestDetails, RepositoryRef};

/// Pull request actions that (re)start the check cycle.
const ANNOUNCED_ACTIONS: [&str; 2] = ["opened", "synchronize"];

// ============================================================================
// Event Kinds
// ============================================================================

/// Event type declared by the `x-github-event` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    PullRequest,
    Status,
    Other(String),
}

impl EventKind {
    /// Parse the header value.
    pub fn from_header(value: &str) -> Self {
        match value.trim() {
            "pull_request" => Self::PullRequest,
            "status" => Self::Status,
            other => Self::Other(other.to_string()),
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::PullRequest => "pull_request",
            Self::Status => "status",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Parsed Events
// ============================================================================

/// A `pull_request` delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestEvent {
    pub action: String,
    pub repository: RepositoryRef,
    pub head_sha: String,
    pub details: PullRequestDetails,
}

/// A `status` delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub repository: RepositoryRef,
    pub sha: String,
    pub origin: Option<OriginStatus>,
}

/// A webhook delivery the notifier understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    PullRequest(PullRequestEvent),
    Status(StatusEvent),
}

/// What to evaluate for a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusParameters {
    pub repository: RepositoryRef,
    pub git_ref: String,
    pub origin: Option<OriginStatus>,
}

impl WebhookEvent {
    /// Parse a payload according to its declared event type.
    ///
    /// # Errors
    ///
    /// - `IneligibleEvent` for event types other than `pull_request` and `status`
    /// - `MalformedPayload` when a required field is missing
    pub fn parse(event_type: &str, payload: &Value) -> NotifierResult<Self> {
        match EventKind::from_header(event_type) {
            EventKind::PullRequest => Ok(Self::PullRequest(PullRequestEvent {
                action: required_str(payload, &["action"])?,
                repository: extract_repository(payload)?,
                head_sha: required_str(payload, &["pull_request", "head", "sha"])?,
                details: PullRequestDetails {
                    title: required_str(payload, &["pull_request", "title"])?,
                    author: required_str(payload, &["pull_request", "user", "login"])?,
                    url: required_str(payload, &["pull_request", "html_url"])?,
                    body: optional_str(payload, &["pull_request", "body"]),
                },
            })),
            EventKind::Status => {
                let repository = extract_repository(payload)?;
                let sha = required_str(payload, &["sha"])?;
                let origin = extract_origin(payload)?;
                if origin.is_none() {
                    debug!(
                        repository = %repository,
                        sha = %sha,
                        "Status delivery has no origin id; newer statuses cannot suppress it"
                    );
                }
                Ok(Self::Status(StatusEvent {
                    repository,
                    sha,
                    origin,
                }))
            }
            EventKind::Other(name) => Err(NotifierError::IneligibleEvent { event_type: name }),
        }
    }

    /// Event kind of this delivery.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PullRequest(_) => EventKind::PullRequest,
            Self::Status(_) => EventKind::Status,
        }
    }

    /// Repository the delivery belongs to.
    pub fn repository(&self) -> &RepositoryRef {
        match self {
            Self::PullRequest(event) => &event.repository,
            Self::Status(event) => &event.repository,
        }
    }

    /// Commit ref and origin status to evaluate.
    pub fn status_parameters(&self) -> StatusParameters {
        match self {
            Self::PullRequest(event) => StatusParameters {
                repository: event.repository.clone(),
                git_ref: event.head_sha.clone(),
                origin: None,
            },
            Self::Status(event) => StatusParameters {
                repository: event.repository.clone(),
                git_ref: event.sha.clone(),
                origin: event.origin,
            },
        }
    }

    /// Pull request to announce.
    ///
    /// `pull_request` deliveries embed the pull request. `status` deliveries
    /// only carry a commit SHA, so the open pull requests are scanned from the
    /// last towards the first for one whose head is that commit. `Ok(None)`
    /// means the commit belongs to no open pull request.
    pub async fn pull_request_details(
        &self,
        github: &dyn GitHubLookup,
    ) -> NotifierResult<Option<PullRequestDetails>> {
        match self {
            Self::PullRequest(event) => Ok(Some(event.details.clone())),
            Self::Status(event) => {
                let open = github.list_open_pull_requests(&event.repository).await?;
                Ok(open
                    .into_iter()
                    .rev()
                    .find(|pr| pr.head_sha == event.sha)
                    .map(|pr| pr.details))
            }
        }
    }
}

// ============================================================================
// Classifier Operations
// ============================================================================

/// Whether a delivery should be processed at all.
///
/// `pull_request` deliveries qualify when the action is `opened` or
/// `synchronize`; every `status` delivery qualifies.
pub fn validate_eligibility(event_type: &str, payload: &Value) -> bool {
    match EventKind::from_header(event_type) {
        EventKind::PullRequest => payload
            .get("action")
            .and_then(Value::as_str)
            .map(|action| ANNOUNCED_ACTIONS.contains(&action))
            .unwrap_or(false),
        EventKind::Status => true,
        EventKind::Other(_) => false,
    }
}

/// Extract the repository, commit ref and origin status of a delivery.
pub fn extract_status_parameters(
    event_type: &str,
    payload: &Value,
) -> NotifierResult<StatusParameters> {
    WebhookEvent::parse(event_type, payload).map(|event| event.status_parameters())
}

/// Extract the pull request to announce for a delivery.
///
/// See [`WebhookEvent::pull_request_details`].
pub async fn extract_pull_request_parameters(
    event_type: &str,
    payload: &Value,
    github: &dyn GitHubLookup,
) -> NotifierResult<Option<PullRequestDetails>> {
    WebhookEvent::parse(event_type, payload)?
        .pull_request_details(github)
        .await
}

// ============================================================================
// Field extraction
// ============================================================================

fn lookup<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(payload, |value, key| value.get(key))
}

fn required_str(payload: &Value, path: &[&str]) -> NotifierResult<String> {
    lookup(payload, path)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| NotifierError::malformed(path.join(".")))
}

fn optional_str(payload: &Value, path: &[&str]) -> Option<String> {
    lookup(payload, path)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn extract_repository(payload: &Value) -> NotifierResult<RepositoryRef> {
    Ok(RepositoryRef {
        owner: required_str(payload, &["repository", "owner", "login"])?,
        name: required_str(payload, &["repository", "name"])?,
    })
}

/// Origin identity of a status delivery.
///
/// Both the id and the timestamp must be present for the origin to exist;
/// a timestamp that is present but unparseable is a malformed payload.
fn extract_origin(payload: &Value) -> NotifierResult<Option<OriginStatus>> {
    let id = payload.get("id").and_then(Value::as_u64);
    let updated_at = match payload.get("updated_at").and_then(Value::as_str) {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(raw)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|_| NotifierError::malformed("updated_at"))?,
        ),
        None => None,
    };

    Ok(match (id, updated_at) {
        (Some(id), Some(updated_at)) => Some(OriginStatus { id, updated_at }),
        _ => None,
    })
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
