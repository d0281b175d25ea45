//! # PR Notifier Core
//!
//! Domain logic for announcing GitHub pull requests in a chat room once their
//! checks have settled.
//!
//! This crate contains:
//! - [`event`]: classification of `pull_request` and `status` webhook deliveries
//! - [`status`]: combined status evaluation and deduplication rules
//! - [`message`]: announcement text composition
//! - [`notifier`]: the per-request orchestration tying the above together
//!
//! ## Architecture
//!
//! Business logic depends only on the [`github::GitHubLookup`] and
//! [`chat::ChatDelivery`] traits. The implementations in [`adapters`] are
//! injected at startup by the service binary.
//!
//! ## Usage
//!
//! ```rust
//! use pr_notifier_core::message::build_mention_line;
//!
//! let line = build_mention_line(Some("cc @alice @alice"));
//! assert_eq!(line, "\nMentioned: @alice");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard result type for notifier operations
pub type NotifierResult<T> = Result<T, NotifierError>;

// ============================================================================
// Shared Domain Types
// ============================================================================

/// Repository coordinates used for GitHub lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    /// Create a repository reference
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Pull request metadata needed to compose an announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDetails {
    pub title: String,
    pub author: String,
    pub url: String,
    pub body: Option<String>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Top-level error type for notifier operations
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    /// The payload lacks a field required for its declared event type.
    #[error("Malformed payload: missing or invalid field '{field}'")]
    MalformedPayload { field: String },

    /// The event type or action is not one the notifier handles.
    #[error("Ineligible event: {event_type}")]
    IneligibleEvent { event_type: String },

    /// A GitHub call failed or timed out.
    ///
    /// `transient` marks failures (timeouts, 5xx, rate limiting) that a later
    /// delivery for the same commit may not hit.
    #[error("GitHub {operation} failed: {message}")]
    UpstreamLookupFailure {
        operation: String,
        message: String,
        transient: bool,
    },

    /// The chat collaborator rejected a message.
    #[error("Chat delivery failed: {0}")]
    ChatDelivery(#[from] chat::ChatError),
}

impl NotifierError {
    /// Build an upstream failure for the named GitHub operation.
    pub fn upstream(
        operation: impl Into<String>,
        error: impl fmt::Display,
        transient: bool,
    ) -> Self {
        Self::UpstreamLookupFailure {
            operation: operation.into(),
            message: error.to_string(),
            transient,
        }
    }

    /// Build a malformed payload error for a dotted field path.
    pub fn malformed(field: impl Into<String>) -> Self {
        Self::MalformedPayload {
            field: field.into(),
        }
    }

    /// Whether the failure should be reported to the room as a diagnostic.
    ///
    /// Payload problems are dropped silently; only GitHub lookup failures are
    /// surfaced to the people watching the room.
    pub fn is_reportable(&self) -> bool {
        matches!(self, Self::UpstreamLookupFailure { .. })
    }

    /// Whether the failure was a transient GitHub condition.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::UpstreamLookupFailure {
                transient: true,
                ..
            }
        )
    }
}

// ============================================================================
// Module declarations
// ============================================================================

/// Infrastructure implementations of the collaborator traits
pub mod adapters;

/// Chat delivery abstraction
pub mod chat;

/// Webhook event classification
pub mod event;

/// GitHub lookup abstraction
pub mod github;

/// Announcement composition
pub mod message;

/// Per-request orchestration
pub mod notifier;

/// Combined status evaluation
pub mod status;

pub use chat::{ChatDelivery, ChatError};
pub use event::{EventKind, StatusParameters, WebhookEvent};
pub use github::{GitHubLookup, OpenPullRequest};
pub use message::{Announcement, StatusLines};
pub use notifier::{NotificationOutcome, NotificationRequest, Notifier, NotifierConfig};
pub use status::{CombinedStatus, OriginStatus, ResolvedStatus, StatusEntry, StatusState};

#[cfg(test)]
mod test_support;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
