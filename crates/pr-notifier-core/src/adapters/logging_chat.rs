//! Chat sink that writes messages to the log.
//!
//! Used when no chat webhook is configured, so the service can run (and be
//! observed) without a chat backend.

use async_trait::async_trait;
use tracing::info;

use crate::chat::{ChatDelivery, ChatError};

#[derive(Debug, Default, Clone)]
pub struct LoggingChatClient;

impl LoggingChatClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatDelivery for LoggingChatClient {
    async fn deliver_message(&self, room: &str, text: &str) -> Result<(), ChatError> {
        info!(room = %room, text = %text, "Chat message");
        Ok(())
    }
}
