//! Chat delivery over an HTTP webhook.
//!
//! Each message is POSTed as `{"room": "...", "text": "..."}`. Any chat
//! bridge that accepts that shape (a Hubot HTTP listener, a small relay in
//! front of Slack or Matrix) can sit behind it.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::chat::{ChatDelivery, ChatError};

#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    room: &'a str,
    text: &'a str,
}

/// Posts messages to a chat webhook URL.
pub struct WebhookChatClient {
    webhook_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl WebhookChatClient {
    /// Create a client for `webhook_url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::NotConfigured` for an empty URL and
    /// `ChatError::Http` if the HTTP client cannot be built.
    pub fn new(
        webhook_url: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let webhook_url = webhook_url.into();
        if webhook_url.trim().is_empty() {
            return Err(ChatError::NotConfigured("chat.webhook_url".to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            webhook_url,
            auth_token: auth_token.filter(|token| !token.is_empty()),
            client,
        })
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }
}

impl std::fmt::Debug for WebhookChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookChatClient")
            .field("webhook_url", &self.webhook_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

#[async_trait]
impl ChatDelivery for WebhookChatClient {
    async fn deliver_message(&self, room: &str, text: &str) -> Result<(), ChatError> {
        debug!(room = %room, "Sending chat message");

        let mut request = self
            .client
            .post(&self.webhook_url)
            .json(&ChatPayload { room, text });
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(
            room = %room,
            status = %status,
            body = %body,
            "Chat webhook request failed"
        );

        Err(ChatError::Rejected {
            status: status.as_u16(),
            message: body,
        })
    }
}

#[cfg(test)]
#[path = "chat_webhook_tests.rs"]
mod tests;
