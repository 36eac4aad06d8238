//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Missing required field that must be provided by CLI, environment or
    /// config file.
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired {
        /// Name of the missing field
        field: &'static str,
        /// Hint for how to provide the value
        hint: &'static str,
    },

    /// A required secret was provided but is empty.
    #[error("Field {field} must not be empty")]
    EmptyValue {
        /// Name of the empty field
        field: &'static str,
    },

    /// Invalid URL provided.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The invalid URL string
        url: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid listen address.
    #[error("Invalid listen address '{value}': {reason}")]
    InvalidListen {
        /// The invalid address
        value: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid webhook path.
    #[error("Invalid webhook path '{0}': must start with '/'")]
    InvalidPath(String),

    /// Invalid duration value.
    #[error("Invalid {field}: {reason}")]
    InvalidDuration {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid retry configuration.
    #[error("Invalid retry configuration: {0}")]
    InvalidRetry(String),
}

/// Well-known field names for `MissingRequired` errors.
///
/// Use these constants for compile-time safety when matching field names.
pub mod field {
    /// The inbound webhook key.
    pub const WEBHOOK_KEY: &str = "webhook_key";
    /// The Last.fm API key.
    pub const LASTFM_API_KEY: &str = "lastfm_api_key";
    /// The Last.fm shared secret.
    pub const LASTFM_SECRET: &str = "lastfm_secret";
    /// The Last.fm session key.
    pub const LASTFM_SESSION_KEY: &str = "lastfm_session_key";
}

impl ConfigError {
    /// Creates a `MissingRequired` error for a required field.
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}
