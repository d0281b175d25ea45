//! Configuration types for the HTTP service
//!
//! Sources are layered, later ones overriding earlier ones:
//!
//! 1. `/etc/pr-notifier/service.yaml`
//! 2. `./config/service.yaml`
//! 3. the file named by `PRN_CONFIG_FILE` (must exist when set)
//! 4. `PRN__`-prefixed environment variables, e.g. `PRN__SERVER__PORT=9090`
//! 5. the Hubot-era variables `GITHUB_API_TOKEN`, `GITHUB_HOST` and
//!    `GITHUB_PATH_PREFIX`, each also accepted with a `HUBOT_` prefix

use pr_notifier_core::{NotifierConfig, StatusLines};
use pr_notifier_github::ClientConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::errors::ConfigError;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_FILE_ENV: &str = "PRN_CONFIG_FILE";

/// Prefix for structured environment overrides.
pub const ENV_PREFIX: &str = "PRN";

const SYSTEM_CONFIG_FILE: &str = "/etc/pr-notifier/service";
const LOCAL_CONFIG_FILE: &str = "config/service";

const TOKEN_VARS: [&str; 2] = ["GITHUB_API_TOKEN", "HUBOT_GITHUB_API_TOKEN"];
const HOST_VARS: [&str; 2] = ["GITHUB_HOST", "HUBOT_GITHUB_HOST"];
const PATH_PREFIX_VARS: [&str; 2] = ["GITHUB_PATH_PREFIX", "HUBOT_GITHUB_PATH_PREFIX"];

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// GitHub API access
    pub github: GitHubConfig,

    /// Announcement behaviour
    pub notifier: NotifierSettings,

    /// Chat delivery
    pub chat: ChatConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from the standard files and the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Loading` when a file is malformed, the explicit
    /// file is missing, or a value cannot be converted to its field type.
    pub fn load() -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(&[SYSTEM_CONFIG_FILE, LOCAL_CONFIG_FILE], &env)
    }

    /// Load configuration from `optional_files` and the given environment.
    pub fn load_from(
        optional_files: &[&str],
        env: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        for file in optional_files {
            builder = builder.add_source(
                config::File::with_name(file)
                    .required(false)
                    .format(config::FileFormat::Yaml),
            );
        }

        if let Some(explicit_path) = env.get(CONFIG_FILE_ENV).filter(|p| !p.is_empty()) {
            builder = builder.add_source(
                config::File::with_name(explicit_path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
        }

        let structured: HashMap<String, String> = env
            .iter()
            .filter(|(key, _)| key.starts_with(&format!("{}__", ENV_PREFIX)))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let mut service_config: ServiceConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(structured)),
            )
            .build()?
            .try_deserialize()?;

        service_config.apply_legacy_env(|key| env.get(key).cloned());
        Ok(service_config)
    }

    /// Apply the Hubot-era GitHub variables.
    ///
    /// For each setting the unprefixed name wins over the `HUBOT_` one. Empty
    /// values are ignored. A host without a scheme is taken as an HTTPS host.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.trim().is_empty())
        };

        if let Some(token) = first(&TOKEN_VARS) {
            self.github.api_token = token;
        }

        if let Some(host) = first(&HOST_VARS) {
            let host = host.trim().trim_end_matches('/');
            self.github.api_url = if host.contains("://") {
                host.to_string()
            } else {
                format!("https://{}", host)
            };
        }

        if let Some(prefix) = first(&PATH_PREFIX_VARS) {
            self.github.path_prefix = Some(prefix);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github.api_token.trim().is_empty() {
            return Err(ConfigError::invalid(
                "GitHub API token is required (github.api_token or GITHUB_API_TOKEN)",
            ));
        }

        if self.github.timeout_ms == 0 {
            return Err(ConfigError::invalid("github.timeout_ms must be greater than 0"));
        }

        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port must be greater than 0"));
        }

        if !self.server.webhook_path.starts_with('/') {
            return Err(ConfigError::invalid(format!(
                "server.webhook_path must start with '/': '{}'",
                self.server.webhook_path
            )));
        }

        if self.server.webhook_path == "/" {
            return Err(ConfigError::invalid(
                "server.webhook_path must not be the health check path '/'",
            ));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,

    /// Path GitHub delivers webhooks to
    pub webhook_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_seconds: 30,
            max_body_size: 25 * 1024 * 1024, // GitHub caps webhook payloads at 25MB
            webhook_path: "/hubot/gh-pull-requests".to_string(),
        }
    }
}

/// GitHub API configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_token: String,

    /// API base URL; a GitHub Enterprise host for on-premise installs
    pub api_url: String,

    /// Path prefix for GitHub Enterprise, e.g. `/api/v3`
    pub path_prefix: Option<String>,

    pub timeout_ms: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            api_url: "https://api.github.com".to_string(),
            path_prefix: None,
            timeout_ms: 5000,
        }
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_token", &"<REDACTED>")
            .field("api_url", &self.api_url)
            .field("path_prefix", &self.path_prefix)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl GitHubConfig {
    /// Client settings for `pr-notifier-github`.
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::default()
            .with_github_api_url(self.api_url.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms));

        match &self.path_prefix {
            Some(prefix) => config.with_path_prefix(prefix.clone()),
            None => config,
        }
    }
}

/// Announcement settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierSettings {
    pub pull_request_settle_delay_ms: u64,
    pub status_settle_delay_ms: u64,
    pub failure_line: String,
    pub success_line: String,
    pub error_prefix: String,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        let defaults = NotifierConfig::default();
        Self {
            pull_request_settle_delay_ms: defaults.pull_request_settle_delay.as_millis() as u64,
            status_settle_delay_ms: defaults.status_settle_delay.as_millis() as u64,
            failure_line: defaults.status_lines.failure,
            success_line: defaults.status_lines.success,
            error_prefix: defaults.error_prefix,
        }
    }
}

impl NotifierSettings {
    pub fn notifier_config(&self) -> NotifierConfig {
        NotifierConfig {
            pull_request_settle_delay: Duration::from_millis(self.pull_request_settle_delay_ms),
            status_settle_delay: Duration::from_millis(self.status_settle_delay_ms),
            status_lines: StatusLines {
                failure: self.failure_line.clone(),
                success: self.success_line.clone(),
            },
            error_prefix: self.error_prefix.clone(),
        }
    }
}

/// Chat delivery configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Chat webhook; messages are only logged when unset
    pub webhook_url: Option<String>,

    /// Bearer token sent to the chat webhook
    pub auth_token: Option<String>,

    /// Room used when a delivery carries no `room` query parameter
    pub default_room: Option<String>,

    pub timeout_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            auth_token: None,
            default_room: None,
            timeout_ms: 5000,
        }
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("webhook_url", &self.webhook_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<REDACTED>"))
            .field("default_room", &self.default_room)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
