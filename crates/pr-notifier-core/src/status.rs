//! # Status Evaluation
//!
//! Decides whether a commit's combined status has settled into something
//! worth announcing.
//!
//! Two rules keep the room from being spammed by the stream of status
//! deliveries GitHub sends for a single push:
//!
//! - A failing aggregate is held back while any individual check is still
//!   pending.
//! - A successful aggregate is only announced by the delivery for the most
//!   recently updated status entry; older deliveries resolve to
//!   [`ResolvedStatus::NoOp`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a single status entry or of the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Success,
    Failure,
    Error,
    Pending,
}

impl StatusState {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One status entry of a combined status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub id: u64,
    pub state: StatusState,
    pub context: String,
    pub updated_at: DateTime<Utc>,
}

/// Snapshot of the combined status for a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedStatus {
    /// Number of status entries reported for the ref
    pub total_count: u64,

    /// Aggregate state computed by GitHub
    pub state: StatusState,

    /// Status entries in the order GitHub returned them
    pub statuses: Vec<StatusEntry>,
}

impl CombinedStatus {
    /// Combined status for a ref that has no statuses at all.
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            state: StatusState::Pending,
            statuses: Vec::new(),
        }
    }
}

/// Identity of the status entry that triggered a `status` delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginStatus {
    pub id: u64,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of evaluating a combined status.
///
/// `Pending` and `NoOp` suppress the announcement; every other value is
/// announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolvedStatus {
    Success,
    Failure,
    Error,
    Pending,
    None,
    NoOp,
}

impl ResolvedStatus {
    /// Whether this status triggers an announcement.
    pub fn is_announceable(&self) -> bool {
        matches!(
            self,
            Self::Success | Self::Failure | Self::Error | Self::None
        )
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
            Self::Pending => "pending",
            Self::None => "none",
            Self::NoOp => "no-op",
        }
    }
}

impl From<StatusState> for ResolvedStatus {
    fn from(state: StatusState) -> Self {
        match state {
            StatusState::Success => Self::Success,
            StatusState::Failure => Self::Failure,
            StatusState::Error => Self::Error,
            StatusState::Pending => Self::Pending,
        }
    }
}

impl fmt::Display for ResolvedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolve a combined status snapshot into an announceable state.
///
/// `origin` identifies the status entry whose delivery is being handled; it
/// is absent for `pull_request` deliveries.
///
/// # Examples
///
/// ```
/// use pr_notifier_core::status::{evaluate, CombinedStatus, ResolvedStatus};
///
/// assert_eq!(evaluate(&CombinedStatus::empty(), None), ResolvedStatus::None);
/// ```
pub fn evaluate(combined: &CombinedStatus, origin: Option<&OriginStatus>) -> ResolvedStatus {
    if combined.total_count == 0 {
        return ResolvedStatus::None;
    }

    let result = ResolvedStatus::from(combined.state);

    match result {
        ResolvedStatus::Failure | ResolvedStatus::Error => {
            if combined
                .statuses
                .iter()
                .any(|entry| entry.state == StatusState::Pending)
            {
                return ResolvedStatus::Pending;
            }
        }
        ResolvedStatus::Success => {
            if let Some(origin) = origin {
                if combined
                    .statuses
                    .iter()
                    .any(|entry| entry.id != origin.id && entry.updated_at > origin.updated_at)
                {
                    return ResolvedStatus::NoOp;
                }
            }
        }
        _ => {}
    }

    result
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
