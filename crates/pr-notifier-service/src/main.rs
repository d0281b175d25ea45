//! # PR Notifier Service
//!
//! Binary entry point for the pull request notifier.
//!
//! This executable:
//! - Loads configuration from files and the environment
//! - Initializes logging
//! - Wires the GitHub client and chat delivery into the notifier
//! - Starts the HTTP server from pr-notifier-api

use anyhow::Context;
use pr_notifier_api::{start_server, ChatConfig, LoggingConfig, ServiceConfig, ServiceError};
use pr_notifier_core::adapters::{LoggingChatClient, WebhookChatClient};
use pr_notifier_core::{ChatDelivery, Notifier};
use pr_notifier_github::GitHubClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration is loaded before logging so the output format can follow
    // it; load errors go to stderr.
    let service_config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration; aborting: {}", e);
            std::process::exit(3);
        }
    };

    init_logging(&service_config.logging);
    info!("Starting PR Notifier Service");

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(ServiceError::from(e).exit_code());
    }

    let github = GitHubClient::new(
        service_config.github.api_token.clone(),
        service_config.github.client_config(),
    )
    .context("Failed to create GitHub client")?;

    let chat = build_chat(&service_config.chat).context("Failed to create chat client")?;

    let notifier = Arc::new(Notifier::new(
        Arc::new(github),
        chat,
        service_config.notifier.notifier_config(),
    ));

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        webhook_path = %service_config.server.webhook_path,
        "Starting HTTP server"
    );

    if let Err(e) = start_server(service_config, notifier).await {
        error!("Failed to start server: {}", e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &logging.level;
        format!(
            "pr_notifier_service={level},pr_notifier_api={level},pr_notifier_core={level},pr_notifier_github={level},tower_http=debug"
        )
        .into()
    });

    if logging.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_chat(config: &ChatConfig) -> anyhow::Result<Arc<dyn ChatDelivery>> {
    match config.webhook_url.as_deref().filter(|url| !url.trim().is_empty()) {
        Some(url) => {
            let client = WebhookChatClient::new(
                url,
                config.auth_token.clone(),
                Duration::from_millis(config.timeout_ms),
            )?;
            info!(webhook_url = %url, "Delivering chat messages to webhook");
            Ok(Arc::new(client))
        }
        None => {
            warn!("No chat webhook configured; messages will only be logged");
            Ok(Arc::new(LoggingChatClient::new()))
        }
    }
}
