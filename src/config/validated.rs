//! Validated configuration after merging CLI, environment and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::lastfm::{LastFmCredentials, RetryPolicy};

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args (which already
/// carry environment values) and an optional TOML config.
///
/// `Debug` and `Display` never print the webhook key, the shared secret or
/// the session key.
pub struct ValidatedConfig {
    /// Address the HTTP listener binds to
    pub listen: SocketAddr,

    /// Path of the webhook endpoint
    pub path: String,

    /// Key inbound callers must present
    pub webhook_key: String,

    /// Last.fm credentials
    pub credentials: LastFmCredentials,

    /// Last.fm API endpoint
    pub api_url: Url,

    /// Timeout for a single Last.fm request
    pub request_timeout: Duration,

    /// Retry policy for Last.fm calls
    pub retry_policy: RetryPolicy,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Debug for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedConfig")
            .field("listen", &self.listen)
            .field("path", &self.path)
            .field("webhook_key", &"<redacted>")
            .field("credentials", &self.credentials)
            .field("api_url", &self.api_url.as_str())
            .field("request_timeout", &self.request_timeout)
            .field("retry_policy", &self.retry_policy)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ listen: {}, path: {}, lastfm: {}, api_key: {}, timeout: {}s, \
             retry: {}x/{}ms }}",
            self.listen,
            self.path,
            self.api_url,
            self.credentials.api_key,
            self.request_timeout.as_secs(),
            self.retry_policy.max_attempts,
            self.retry_policy.delay.as_millis(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments (including their environment fallbacks) take precedence
    /// over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A credential or the webhook key is missing or empty
    /// - The listen address, path or Last.fm URL is invalid
    /// - The Last.fm timeout is zero
    /// - The retry policy allows zero attempts
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let listen = Self::resolve_listen(cli, toml)?;
        let path = Self::resolve_path(cli, toml)?;

        let webhook_key = required(
            cli.webhook_key.as_deref(),
            toml.and_then(|t| t.webhook.api_key.as_deref()),
            field::WEBHOOK_KEY,
            "Use --webhook-key, set WEBHOOK_API_KEY or set webhook.api_key in config file",
        )?;

        let credentials = Self::resolve_credentials(cli, toml)?;
        let api_url = Self::resolve_api_url(cli, toml)?;
        let request_timeout = Self::resolve_request_timeout(cli, toml)?;
        let retry_policy = Self::build_retry_policy(cli, toml)?;

        Ok(Self {
            listen,
            path,
            webhook_key,
            credentials,
            api_url,
            request_timeout,
            retry_policy,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_listen(cli: &Cli, toml: Option<&TomlConfig>) -> Result<SocketAddr, ConfigError> {
        let value = cli
            .listen
            .as_deref()
            .or_else(|| toml.and_then(|t| t.server.listen.as_deref()))
            .unwrap_or(defaults::LISTEN);

        value
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidListen {
                value: value.to_string(),
                reason: e.to_string(),
            })
    }

    fn resolve_path(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        let path = cli
            .path
            .as_deref()
            .or_else(|| toml.and_then(|t| t.server.path.as_deref()))
            .unwrap_or(defaults::PATH);

        if !path.starts_with('/') {
            return Err(ConfigError::InvalidPath(path.to_string()));
        }

        Ok(path.to_string())
    }

    fn resolve_credentials(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<LastFmCredentials, ConfigError> {
        let lastfm = toml.map(|t| &t.lastfm);

        let api_key = required(
            cli.lastfm_api_key.as_deref(),
            lastfm.and_then(|l| l.api_key.as_deref()),
            field::LASTFM_API_KEY,
            "Use --lastfm-api-key, set LAST_FM_API_KEY or set lastfm.api_key in config file",
        )?;

        let shared_secret = required(
            cli.lastfm_secret.as_deref(),
            lastfm.and_then(|l| l.shared_secret.as_deref()),
            field::LASTFM_SECRET,
            "Use --lastfm-secret, set LAST_FM_SHARED_SECRET or set lastfm.shared_secret in config file",
        )?;

        let session_key = required(
            cli.lastfm_session_key.as_deref(),
            lastfm.and_then(|l| l.session_key.as_deref()),
            field::LASTFM_SESSION_KEY,
            "Use --lastfm-session-key, set LAST_FM_SESSION_KEY or set lastfm.session_key in config file",
        )?;

        Ok(LastFmCredentials::new(api_key, shared_secret, session_key))
    }

    fn resolve_api_url(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Url, ConfigError> {
        let url_str = cli
            .lastfm_url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.lastfm.api_url.as_deref()))
            .unwrap_or(defaults::LASTFM_URL);

        let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: url_str.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(url)
    }

    fn resolve_request_timeout(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Duration, ConfigError> {
        let seconds = cli
            .lastfm_timeout_secs
            .or_else(|| toml.and_then(|t| t.lastfm.timeout_secs))
            .unwrap_or(defaults::LASTFM_TIMEOUT_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "lastfm timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }

    fn build_retry_policy(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<RetryPolicy, ConfigError> {
        let retry = toml.map(|t| &t.retry);

        // Priority: CLI explicit > TOML > default
        let max_attempts = cli
            .retry_max
            .or_else(|| retry.and_then(|r| r.max_attempts))
            .unwrap_or(defaults::RETRY_MAX_ATTEMPTS);

        let delay_ms = cli
            .retry_delay_ms
            .or_else(|| retry.and_then(|r| r.delay_ms))
            .unwrap_or(defaults::RETRY_DELAY_MS);

        if max_attempts < RetryPolicy::MIN_MAX_ATTEMPTS {
            return Err(ConfigError::InvalidRetry(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        Ok(RetryPolicy::new()
            .with_max_attempts(max_attempts)
            .with_delay(Duration::from_millis(delay_ms)))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn required(
    cli: Option<&str>,
    toml: Option<&str>,
    field: &'static str,
    hint: &'static str,
) -> Result<String, ConfigError> {
    let value = cli
        .or(toml)
        .ok_or_else(|| ConfigError::missing(field, hint))?;

    if value.trim().is_empty() {
        return Err(ConfigError::EmptyValue { field });
    }

    Ok(value.to_string())
}
