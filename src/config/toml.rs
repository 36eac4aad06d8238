//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments and the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Listener configuration section
    #[serde(default)]
    pub server: ServerSection,

    /// Inbound webhook configuration section
    #[serde(default)]
    pub webhook: WebhookSection,

    /// Last.fm configuration section
    #[serde(default)]
    pub lastfm: LastFmSection,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetrySection,
}

/// Listener configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Address to listen on
    pub listen: Option<String>,

    /// Webhook endpoint path
    pub path: Option<String>,
}

/// Inbound webhook configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookSection {
    /// Key callers must present
    pub api_key: Option<String>,
}

/// Last.fm configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LastFmSection {
    /// API endpoint
    pub api_url: Option<String>,

    /// Application API key
    pub api_key: Option<String>,

    /// Application shared secret
    pub shared_secret: Option<String>,

    /// User session key
    pub session_key: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Retry policy configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Maximum number of attempts
    pub max_attempts: Option<u32>,

    /// Delay between attempts in milliseconds
    pub delay_ms: Option<u64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# Scrobble relay configuration file
#
# Secrets can also be supplied through the environment:
#   WEBHOOK_API_KEY, LAST_FM_API_KEY, LAST_FM_SHARED_SECRET, LAST_FM_SESSION_KEY
# CLI arguments and environment variables take precedence over this file.

[server]
# Address to listen on (default: 0.0.0.0:3000)
# listen = "0.0.0.0:3000"

# Webhook endpoint path (default: /api/webhook)
# Configure Plex with: http://<host>:3000/api/webhook?apiKey=<webhook.api_key>
# path = "/api/webhook"

[webhook]
# Key Plex must pass as the apiKey query parameter (required)
# api_key = "change-me"

[lastfm]
# API endpoint (default: https://ws.audioscrobbler.com/2.0/)
# api_url = "https://ws.audioscrobbler.com/2.0/"

# Application API key and shared secret (required)
# api_key = ""
# shared_secret = ""

# Session key of the scrobbling user (required)
# session_key = ""

# Seconds before a single request to Last.fm is abandoned (default: 10)
# timeout_secs = 10

[retry]
# Maximum attempts per call when Last.fm reports a temporary error (default: 5)
# max_attempts = 5

# Delay between attempts in milliseconds (default: 2000)
# delay_ms = 2000
"#
    .to_string()
}
