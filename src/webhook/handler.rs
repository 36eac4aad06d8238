//! Webhook request orchestration.

use std::future::Future;

use serde_json::{Value, json};
use subtle::ConstantTimeEq;

use crate::dispatch::{Action, dispatch};
use crate::lastfm::{ApiMethod, ApiOutcome, ScrobbleApi, UpstreamError};
use crate::notification::{NotificationEnvelope, PayloadError};

use super::HandlerError;

/// The status and JSON body of a handled webhook request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResult {
    /// HTTP status code
    pub status: http::StatusCode,
    /// JSON body, if any
    pub body: Option<Value>,
}

impl HandlerResult {
    /// 200 with `{received: true, event}`.
    #[must_use]
    pub fn received(event: &str) -> Self {
        Self {
            status: http::StatusCode::OK,
            body: Some(json!({ "received": true, "event": event })),
        }
    }

    /// 204 with no body.
    #[must_use]
    pub const fn no_content() -> Self {
        Self {
            status: http::StatusCode::NO_CONTENT,
            body: None,
        }
    }

    /// 204 naming the unhandled event.
    #[must_use]
    pub fn unhandled(event: &str) -> Self {
        Self {
            status: http::StatusCode::NO_CONTENT,
            body: Some(json!({ "message": format!("Unhandled event type: {event}") })),
        }
    }

    /// The generic response for a failed request.
    #[must_use]
    pub fn from_error(error: &HandlerError) -> Self {
        Self {
            status: error.status(),
            body: Some(json!({ "error": error.public_message() })),
        }
    }
}

/// Authenticates, parses and relays one webhook notification.
///
/// Holds no per-request state; one instance serves all requests.
#[derive(Debug)]
pub struct WebhookHandler<A> {
    api: A,
    webhook_key: String,
}

impl<A> WebhookHandler<A> {
    /// Creates a handler that accepts callers presenting `webhook_key`.
    #[must_use]
    pub fn new(api: A, webhook_key: impl Into<String>) -> Self {
        Self {
            api,
            webhook_key: webhook_key.into(),
        }
    }

    /// Returns the scrobbling API this handler calls.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Checks the caller-supplied key in constant time.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Unauthorized`] if the key is missing or wrong.
    pub fn authenticate(&self, api_key: Option<&str>) -> Result<(), HandlerError> {
        let matches = api_key.is_some_and(|key| {
            bool::from(key.as_bytes().ct_eq(self.webhook_key.as_bytes()))
        });

        if matches {
            Ok(())
        } else {
            tracing::warn!(attempted_key = ?api_key, "Connection attempted with invalid API key");
            Err(HandlerError::Unauthorized)
        }
    }
}

impl<A: ScrobbleApi> WebhookHandler<A> {
    /// Handles one request.
    ///
    /// `payload` reads the raw `payload` form field. It is only polled after
    /// the caller is authenticated, so an unauthorized body is never read.
    pub async fn handle<F>(&self, api_key: Option<&str>, payload: F) -> HandlerResult
    where
        F: Future<Output = Result<String, PayloadError>> + Send,
    {
        if let Err(e) = self.authenticate(api_key) {
            return HandlerResult::from_error(&e);
        }

        match self.process(payload).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Failed to process Plex webhook: {e}");
                HandlerResult::from_error(&e)
            }
        }
    }

    async fn process<F>(&self, payload: F) -> Result<HandlerResult, HandlerError>
    where
        F: Future<Output = Result<String, PayloadError>> + Send,
    {
        let envelope = NotificationEnvelope::parse(&payload.await?)?;

        let method = match dispatch(&envelope) {
            Action::CallNowPlaying => ApiMethod::UpdateNowPlaying,
            Action::CallScrobble => ApiMethod::Scrobble,
            Action::Ignore => {
                tracing::debug!(
                    event = %envelope.event,
                    media = %envelope.metadata_type,
                    "Ignoring notification"
                );
                return Ok(HandlerResult::no_content());
            }
            Action::UnhandledEvent(event) => {
                tracing::warn!("Unhandled Plex event type received: {event}");
                return Ok(HandlerResult::unhandled(&event));
            }
        };

        match self.api.execute(method, &envelope.track_info).await {
            ApiOutcome::Success(_) => Ok(HandlerResult::received(&envelope.event)),
            ApiOutcome::FatalFailure(e) => Err(e.into()),
            ApiOutcome::TransportFailure(e) => Err(e.into()),
            ApiOutcome::RetryableFailure { code, message } => {
                Err(UpstreamError::Api { code, message }.into())
            }
        }
    }
}
