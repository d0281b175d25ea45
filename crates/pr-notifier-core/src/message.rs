//! # Announcement Composition
//!
//! Builds the chat text announcing a pull request:
//!
//! ```text
//! @here New pull request "{title}" by {author}: {url}{mention line}{status line}
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::status::ResolvedStatus;
use crate::PullRequestDetails;

/// Default text appended when checks failed or errored.
pub const DEFAULT_FAILURE_LINE: &str = "*Ah, Mediocre!* Checks have failed.";

/// Default text appended when checks succeeded.
pub const DEFAULT_SUCCESS_LINE: &str =
    "*You shall ride eternal. Shiny, and chrome.* Checks have succeeded";

static MENTION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn mention_pattern() -> &'static Regex {
    MENTION_PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|\s)@[A-Za-z0-9_\-/]+").expect("mention pattern is a valid regex")
    })
}

/// Status lines appended to announcements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLines {
    pub failure: String,
    pub success: String,
}

impl Default for StatusLines {
    fn default() -> Self {
        Self {
            failure: DEFAULT_FAILURE_LINE.to_string(),
            success: DEFAULT_SUCCESS_LINE.to_string(),
        }
    }
}

/// A composed message and the room it is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub room: String,
    pub text: String,
    pub status: ResolvedStatus,
}

/// Build the `Mentioned:` line for a pull request body.
///
/// Mentions must start the body or follow whitespace. Team mentions
/// (`@org/team`) are kept, anything with two or more slashes is not a
/// mention. Duplicates are removed keeping the first occurrence.
pub fn build_mention_line(body: Option<&str>) -> String {
    let Some(body) = body else {
        return String::new();
    };

    let mut mentions: Vec<&str> = Vec::new();
    for found in mention_pattern().find_iter(body) {
        let mention = found.as_str().trim();
        if mention.matches('/').count() >= 2 {
            continue;
        }
        if !mentions.contains(&mention) {
            mentions.push(mention);
        }
    }

    if mentions.is_empty() {
        String::new()
    } else {
        format!("\nMentioned: {}", mentions.join(", "))
    }
}

/// Build the line describing the check outcome.
pub fn build_status_line(status: ResolvedStatus, lines: &StatusLines) -> String {
    match status {
        ResolvedStatus::Failure | ResolvedStatus::Error => format!("\n{}", lines.failure),
        ResolvedStatus::Success => format!("\n{}", lines.success),
        _ => String::new(),
    }
}

/// Compose the full announcement text.
pub fn compose(details: &PullRequestDetails, status: ResolvedStatus, lines: &StatusLines) -> String {
    format!(
        "@here New pull request \"{}\" by {}: {}{}{}",
        details.title,
        details.author,
        details.url,
        build_mention_line(details.body.as_deref()),
        build_status_line(status, lines)
    )
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
