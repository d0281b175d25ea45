//! # Notifier Orchestration
//!
//! Drives a single webhook delivery from receipt to announcement:
//!
//! ```text
//! RECEIVED -> eligible? --no--> DROPPED
//!          --yes--> settle delay -> fetch combined status -> evaluate
//!                   suppressed  --> DROPPED
//!                   announceable --> pull request lookup
//!                                    not found --> DROPPED
//!                                    found     --> compose -> deliver
//! ```
//!
//! Every request runs in its own task and shares nothing but the
//! collaborators held by [`Notifier`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::chat::ChatDelivery;
use crate::event::{validate_eligibility, EventKind, WebhookEvent};
use crate::github::GitHubLookup;
use crate::message::{compose, Announcement, StatusLines};
use crate::status::{evaluate, ResolvedStatus};
use crate::NotifierError;

/// Default diagnostic prefix for GitHub lookup failures.
pub const DEFAULT_ERROR_PREFIX: &str = "Whoa, I got an error: ";

/// Tunables for the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Wait applied to `pull_request` deliveries so CI can register checks
    pub pull_request_settle_delay: Duration,

    /// Wait applied to `status` deliveries
    pub status_settle_delay: Duration,

    pub status_lines: StatusLines,

    /// Prepended to the error text when a lookup failure is reported to the room
    pub error_prefix: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            pull_request_settle_delay: Duration::from_secs(15),
            status_settle_delay: Duration::ZERO,
            status_lines: StatusLines::default(),
            error_prefix: DEFAULT_ERROR_PREFIX.to_string(),
        }
    }
}

/// One inbound webhook delivery addressed to a room.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    /// Value of the `x-github-event` header
    pub event_type: String,
    pub room: String,
    pub payload: Value,
}

impl NotificationRequest {
    pub fn new(event_type: impl Into<String>, room: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            room: room.into(),
            payload,
        }
    }
}

/// Terminal state of processing one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// Ineligible or malformed delivery
    Dropped { reason: String },

    /// Checks have not settled, or a newer status will announce instead
    Suppressed { status: ResolvedStatus },

    /// The commit is not the head of any open pull request
    NoPullRequest,

    Delivered { announcement: Announcement },

    /// A lookup or the chat delivery failed
    Failed { error: String },
}

/// Announces pull requests whose checks have settled.
pub struct Notifier {
    github: Arc<dyn GitHubLookup>,
    chat: Arc<dyn ChatDelivery>,
    config: NotifierConfig,
}

impl Notifier {
    pub fn new(
        github: Arc<dyn GitHubLookup>,
        chat: Arc<dyn ChatDelivery>,
        config: NotifierConfig,
    ) -> Self {
        Self {
            github,
            chat,
            config,
        }
    }

    /// Delay applied before evaluating a delivery of the given kind.
    pub fn settle_delay(&self, kind: &EventKind) -> Duration {
        match kind {
            EventKind::PullRequest => self.config.pull_request_settle_delay,
            EventKind::Status | EventKind::Other(_) => self.config.status_settle_delay,
        }
    }

    /// Process a request on its own task.
    ///
    /// The caller may drop the handle; processing continues regardless.
    pub fn dispatch(self: &Arc<Self>, request: NotificationRequest) -> JoinHandle<NotificationOutcome> {
        let notifier = Arc::clone(self);
        tokio::spawn(async move { notifier.process(request).await })
    }

    /// Process a request to completion.
    ///
    /// Never fails: every error ends in a [`NotificationOutcome`] after being
    /// logged and, for GitHub lookup failures, reported to the room.
    #[instrument(skip(self, request), fields(
        event_type = %request.event_type,
        room = %request.room,
    ))]
    pub async fn process(&self, request: NotificationRequest) -> NotificationOutcome {
        if !validate_eligibility(&request.event_type, &request.payload) {
            debug!("Ignoring ineligible delivery");
            return NotificationOutcome::Dropped {
                reason: format!("ineligible event '{}'", request.event_type),
            };
        }

        let event = match WebhookEvent::parse(&request.event_type, &request.payload) {
            Ok(event) => event,
            Err(e) => return self.handle_failure(&request.room, e).await,
        };

        let delay = self.settle_delay(&event.kind());
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "Waiting for checks to settle");
            tokio::time::sleep(delay).await;
        }

        match self.announce(&request.room, &event).await {
            Ok(outcome) => outcome,
            Err(e) => self.handle_failure(&request.room, e).await,
        }
    }

    async fn announce(
        &self,
        room: &str,
        event: &WebhookEvent,
    ) -> Result<NotificationOutcome, NotifierError> {
        let params = event.status_parameters();
        let combined = self
            .github
            .get_combined_status(&params.repository, &params.git_ref)
            .await?;

        let status = evaluate(&combined, params.origin.as_ref());
        if !status.is_announceable() {
            info!(
                repository = %params.repository,
                sha = %params.git_ref,
                status = %status,
                "Checks not ready to announce"
            );
            return Ok(NotificationOutcome::Suppressed { status });
        }

        let Some(details) = event.pull_request_details(self.github.as_ref()).await? else {
            info!(
                repository = %params.repository,
                sha = %params.git_ref,
                "No open pull request has this commit as its head"
            );
            return Ok(NotificationOutcome::NoPullRequest);
        };

        let announcement = Announcement {
            room: room.to_string(),
            text: compose(&details, status, &self.config.status_lines),
            status,
        };

        self.chat
            .deliver_message(&announcement.room, &announcement.text)
            .await?;

        info!(
            repository = %params.repository,
            sha = %params.git_ref,
            status = %status,
            url = %details.url,
            "Pull request announced"
        );
        Ok(NotificationOutcome::Delivered { announcement })
    }

    async fn handle_failure(&self, room: &str, failure: NotifierError) -> NotificationOutcome {
        if failure.is_reportable() {
            error!(
                error = %failure,
                transient = failure.is_transient(),
                "GitHub lookup failed"
            );
            let diagnostic = format!("{}{}", self.config.error_prefix, failure);
            if let Err(e) = self.chat.deliver_message(room, &diagnostic).await {
                error!(error = %e, "Failed to report lookup failure to room");
            }
            return NotificationOutcome::Failed {
                error: failure.to_string(),
            };
        }

        match failure {
            NotifierError::MalformedPayload { .. } | NotifierError::IneligibleEvent { .. } => {
                warn!(error = %failure, "Dropping delivery");
                NotificationOutcome::Dropped {
                    reason: failure.to_string(),
                }
            }
            _ => {
                error!(error = %failure, "Failed to deliver announcement");
                NotificationOutcome::Failed {
                    error: failure.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
