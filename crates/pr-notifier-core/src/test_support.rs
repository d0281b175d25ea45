//! Test doubles for the collaborator traits.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::chat::{ChatDelivery, ChatError};
use crate::github::{GitHubLookup, OpenPullRequest};
use crate::status::CombinedStatus;
use crate::{NotifierError, NotifierResult, PullRequestDetails, RepositoryRef};

/// GitHub double returning canned responses and recording calls.
///
/// A `None` response makes the corresponding call fail with a timeout-style
/// upstream error.
pub(crate) struct StubGitHub {
    combined: Option<CombinedStatus>,
    open_pull_requests: Option<Vec<OpenPullRequest>>,
    calls: Mutex<Vec<String>>,
}

impl StubGitHub {
    pub(crate) fn new() -> Self {
        Self {
            combined: Some(CombinedStatus::empty()),
            open_pull_requests: Some(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_combined_status(mut self, combined: CombinedStatus) -> Self {
        self.combined = Some(combined);
        self
    }

    pub(crate) fn with_failing_combined_status(mut self) -> Self {
        self.combined = None;
        self
    }

    pub(crate) fn with_open_pull_requests(mut self, prs: Vec<OpenPullRequest>) -> Self {
        self.open_pull_requests = Some(prs);
        self
    }

    pub(crate) fn with_failing_pull_request_listing(mut self) -> Self {
        self.open_pull_requests = None;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitHubLookup for StubGitHub {
    async fn get_combined_status(
        &self,
        repository: &RepositoryRef,
        git_ref: &str,
    ) -> NotifierResult<CombinedStatus> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("status {} {}", repository, git_ref));
        self.combined
            .clone()
            .ok_or_else(|| {
                NotifierError::upstream("get_combined_status", "Request timeout", true)
            })
    }

    async fn list_open_pull_requests(
        &self,
        repository: &RepositoryRef,
    ) -> NotifierResult<Vec<OpenPullRequest>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("pulls {}", repository));
        self.open_pull_requests
            .clone()
            .ok_or_else(|| {
                NotifierError::upstream("list_open_pull_requests", "Request timeout", true)
            })
    }
}

/// Chat double recording every delivered message.
pub(crate) struct RecordingChat {
    messages: Mutex<Vec<(String, String)>>,
    reject: bool,
}

impl RecordingChat {
    pub(crate) fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            reject: false,
        }
    }

    pub(crate) fn rejecting() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    pub(crate) fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatDelivery for RecordingChat {
    async fn deliver_message(&self, room: &str, text: &str) -> Result<(), ChatError> {
        self.messages
            .lock()
            .unwrap()
            .push((room.to_string(), text.to_string()));
        if self.reject {
            return Err(ChatError::Rejected {
                status: 503,
                message: "chat unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// Open pull request with predictable metadata.
pub(crate) fn open_pull_request(number: u64, head_sha: &str) -> OpenPullRequest {
    OpenPullRequest {
        details: PullRequestDetails {
            title: format!("PR {}", number),
            author: "octocat".to_string(),
            url: format!("https://github.com/octo/widgets/pull/{}", number),
            body: None,
        },
        head_sha: head_sha.to_string(),
    }
}
