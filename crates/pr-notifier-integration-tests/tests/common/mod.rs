//! Common test utilities for pr-notifier integration tests
//!
//! This module provides:
//! - A chat double forwarding messages to a channel
//! - Builders for the router wired to a mocked GitHub API
//! - Webhook payload fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use pr_notifier_api::{create_router, AppState, ServiceConfig};
use pr_notifier_core::{ChatDelivery, ChatError, Notifier, NotifierConfig};
use pr_notifier_github::{ClientConfig, GitHubClient};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::MockServer;

pub type Messages = mpsc::UnboundedReceiver<(String, String)>;

// ============================================================================
// Chat double
// ============================================================================

/// Chat delivery forwarding every message to a channel.
pub struct ChannelChat {
    sender: mpsc::UnboundedSender<(String, String)>,
}

impl ChannelChat {
    pub fn new() -> (Self, Messages) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl ChatDelivery for ChannelChat {
    async fn deliver_message(&self, room: &str, text: &str) -> Result<(), ChatError> {
        let _ = self.sender.send((room.to_string(), text.to_string()));
        Ok(())
    }
}

// ============================================================================
// Application builders
// ============================================================================

/// GitHub client pointed at the mock server.
pub fn github_client(server: &MockServer) -> GitHubClient {
    let config = ClientConfig::default()
        .with_github_api_url(server.uri())
        .with_timeout(Duration::from_millis(500));
    GitHubClient::new("test-token", config).expect("client builds")
}

/// Notifier configuration without settle delays.
pub fn immediate_config() -> NotifierConfig {
    NotifierConfig {
        pull_request_settle_delay: Duration::ZERO,
        status_settle_delay: Duration::ZERO,
        ..NotifierConfig::default()
    }
}

/// Router backed by the mocked GitHub API and an arbitrary chat delivery.
pub fn app_with_chat(github: &MockServer, chat: Arc<dyn ChatDelivery>) -> Router {
    let notifier = Arc::new(Notifier::new(
        Arc::new(github_client(github)),
        chat,
        immediate_config(),
    ));
    create_router(AppState::new(ServiceConfig::default(), notifier))
}

/// Router backed by the mocked GitHub API and a channel chat.
pub fn app(github: &MockServer) -> (Router, Messages) {
    let (chat, messages) = ChannelChat::new();
    (app_with_chat(github, Arc::new(chat)), messages)
}

/// Wait for the next chat message.
pub async fn next_message(messages: &mut Messages) -> Option<(String, String)> {
    tokio::time::timeout(Duration::from_secs(5), messages.recv())
        .await
        .ok()
        .flatten()
}

/// Assert no chat message arrives shortly.
pub async fn assert_no_message(messages: &mut Messages) {
    let received = tokio::time::timeout(Duration::from_millis(300), messages.recv()).await;
    assert!(received.is_err(), "unexpected message: {:?}", received);
}

// ============================================================================
// Requests and payloads
// ============================================================================

pub fn webhook(room: &str, event_type: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/hubot/gh-pull-requests?room={}", room))
        .header("content-type", "application/json")
        .header("x-github-event", event_type)
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

pub fn pull_request_payload(action: &str, sha: &str, body: Option<&str>) -> Value {
    json!({
        "action": action,
        "number": 42,
        "pull_request": {
            "title": "Add widgets",
            "user": { "login": "octocat" },
            "html_url": "https://github.com/octo/widgets/pull/42",
            "body": body,
            "head": { "ref": "feature", "sha": sha }
        },
        "repository": {
            "name": "widgets",
            "full_name": "octo/widgets",
            "owner": { "login": "octo" }
        }
    })
}

pub fn status_payload(id: u64, sha: &str, updated_at: &str) -> Value {
    json!({
        "id": id,
        "sha": sha,
        "state": "success",
        "context": "ci/build",
        "updated_at": updated_at,
        "repository": {
            "name": "widgets",
            "owner": { "login": "octo" }
        }
    })
}

pub fn status_entry(id: u64, state: &str, updated_at: &str) -> Value {
    json!({
        "id": id,
        "state": state,
        "context": format!("ci/{}", id),
        "updated_at": updated_at
    })
}

pub fn combined_status(state: &str, sha: &str, statuses: Vec<Value>) -> Value {
    json!({
        "state": state,
        "sha": sha,
        "total_count": statuses.len(),
        "statuses": statuses
    })
}

pub fn open_pull_request(number: u64, sha: &str) -> Value {
    json!({
        "id": number * 1000,
        "number": number,
        "title": format!("PR {}", number),
        "body": null,
        "state": "open",
        "user": { "login": "octocat" },
        "head": { "ref": format!("branch-{}", number), "sha": sha },
        "html_url": format!("https://github.com/octo/widgets/pull/{}", number)
    })
}
