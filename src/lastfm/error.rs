//! Error types for outbound Last.fm calls.

use thiserror::Error;

/// Error type for HTTP operations.
///
/// Describes a failure to get any response from the server. The Last.fm
/// client surfaces these as [`ApiOutcome::TransportFailure`] without retrying.
///
/// [`ApiOutcome::TransportFailure`]: super::ApiOutcome::TransportFailure
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed (TLS backend, resolver).
    #[error("Failed to build HTTP client: {0}")]
    Setup(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A permanent failure reported by, or about, the Last.fm API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The API returned an error code outside the retryable set.
    #[error("Last.fm API error: {message} (code: {code})")]
    Api {
        /// Last.fm error code
        code: i64,
        /// Message returned alongside the code
        message: String,
    },

    /// Every allowed attempt returned a retryable error code.
    #[error("Max retries reached for Last.fm API after {attempts} attempts. Last error: {message} (code: {code})")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error code from the final attempt
        code: i64,
        /// Message from the final attempt
        message: String,
    },

    /// The API set `error` to something other than an error code.
    #[error("Last.fm API error: {message} (error: {error})")]
    UnexpectedError {
        /// The `error` field as sent, rendered as JSON
        error: String,
        /// Message returned alongside it
        message: String,
    },

    /// The response body could not be parsed as JSON.
    #[error("Invalid Last.fm response (HTTP {status}): {source}")]
    InvalidResponse {
        /// HTTP status of the unparseable response
        status: http::StatusCode,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },
}
