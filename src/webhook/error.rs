//! Error types for inbound webhook handling.

use thiserror::Error;

use crate::lastfm::{HttpError, UpstreamError};
use crate::notification::PayloadError;

/// Error type for a single webhook request.
///
/// Only [`HandlerError::Unauthorized`] is visible to the caller as its own
/// status; every other variant becomes the same generic 500 response and
/// exists for control flow and operator logs.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The caller's `apiKey` did not match the configured key.
    #[error("Unauthorized webhook request")]
    Unauthorized,

    /// The notification payload was missing or malformed.
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// Last.fm rejected the call, or retries ran out.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Last.fm could not be reached.
    #[error(transparent)]
    Transport(#[from] HttpError),
}

impl HandlerError {
    /// Returns the HTTP status reported to the caller.
    #[must_use]
    pub const fn status(&self) -> http::StatusCode {
        match self {
            Self::Unauthorized => http::StatusCode::UNAUTHORIZED,
            Self::Payload(_) | Self::Upstream(_) | Self::Transport(_) => {
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the message placed in the response body's `error` field.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::Payload(_) | Self::Upstream(_) | Self::Transport(_) => "Internal Server Error",
        }
    }
}
