//! # Infrastructure Adapters
//!
//! Implementations of the [`GitHubLookup`](crate::github::GitHubLookup) and
//! [`ChatDelivery`](crate::chat::ChatDelivery) traits.

pub mod chat_webhook;
pub mod github;
pub mod logging_chat;

pub use chat_webhook::WebhookChatClient;
pub use logging_chat::LoggingChatClient;
