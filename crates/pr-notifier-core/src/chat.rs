//! Chat delivery abstraction.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when delivering a chat message.
#[derive(Debug, Error)]
pub enum ChatError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The chat service answered with a non-success status
    #[error("Chat service rejected message: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// Channel is not configured
    #[error("Chat channel not configured: {0}")]
    NotConfigured(String),
}

/// Delivers a message to a chat room.
///
/// Delivery is fire-and-forget from the notifier's point of view: an error is
/// logged by the caller and never retried.
#[async_trait]
pub trait ChatDelivery: Send + Sync {
    /// Post `text` to `room`.
    async fn deliver_message(&self, room: &str, text: &str) -> Result<(), ChatError>;
}
