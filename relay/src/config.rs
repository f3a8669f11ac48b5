use crate::upstream::Endpoints;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://canary.discord.com/api/v10";
pub const DEFAULT_CDN_URL: &str = "https://cdn.discordapp.com";
pub const DEFAULT_TOKEN_ENV: &str = "TOKEN";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Relay and admin listeners both bind {0}")]
    ListenerConflict(String),

    #[error("Upstream timeout cannot be 0")]
    InvalidTimeout,

    #[error("Token environment variable name cannot be empty")]
    EmptyTokenEnv,

    #[error("Invalid {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },
}

/// How an upstream payload carrying a `message` field is answered.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamErrorMode {
    /// Forward the message with a 200 status.
    #[default]
    Passthrough,
    /// Forward the message with the status code the upstream answered with.
    MirrorStatus,
}

/// Relay configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for profile lookups
    #[serde(default)]
    pub listener: Listener,
    /// Listener for health and readiness probes
    #[serde(default = "Listener::admin_default")]
    pub admin_listener: Listener,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub upstream_errors: UpstreamErrorMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listener: Listener::default(),
            admin_listener: Listener::admin_default(),
            upstream: UpstreamConfig::default(),
            upstream_errors: UpstreamErrorMode::default(),
        }
    }
}

impl Config {
    /// Validates the relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.listener == self.admin_listener {
            return Err(ValidationError::ListenerConflict(self.listener.addr()));
        }

        self.upstream.validate()
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

impl Listener {
    fn admin_default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3001,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the listener configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Discord API configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the REST API, users are fetched from `<api_url>/users/<id>`
    pub api_url: String,
    /// Base URL of the CDN that serves avatars and banners
    pub cdn_url: String,
    /// Environment variable holding the bot token
    pub token_env: String,
    /// Deadline for the whole upstream exchange, including the body
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            api_url: DEFAULT_API_URL.into(),
            cdn_url: DEFAULT_CDN_URL.into(),
            token_env: DEFAULT_TOKEN_ENV.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.token_env.trim().is_empty() {
            return Err(ValidationError::EmptyTokenEnv);
        }

        Endpoints::try_from(self)?;
        Ok(())
    }
}
