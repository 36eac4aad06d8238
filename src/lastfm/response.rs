//! Classification of Last.fm responses.

use serde_json::Value;

use super::{HttpError, HttpResponse, RetryPolicy, UpstreamError};

/// A successful Last.fm response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Parsed response body
    pub body: Value,
    /// Number of scrobbles Last.fm accepted the call for but ignored
    /// (`scrobbles["@attr"].ignored`). Zero for now-playing updates.
    pub ignored: u64,
}

impl ApiResponse {
    /// Wraps a parsed success body, reading its ignored-scrobble count.
    #[must_use]
    pub fn from_body(body: Value) -> Self {
        let ignored = ignored_count(&body);
        Self { body, ignored }
    }
}

/// The result of one logical Last.fm call.
#[derive(Debug)]
pub enum ApiOutcome {
    /// Last.fm accepted the call.
    Success(ApiResponse),

    /// Last.fm reported a transient error. Only produced per attempt; the
    /// retrying client turns an exhausted run into [`ApiOutcome::FatalFailure`].
    RetryableFailure {
        /// Last.fm error code
        code: i64,
        /// Message returned alongside the code
        message: String,
    },

    /// Last.fm rejected the call permanently, or retries ran out.
    FatalFailure(UpstreamError),

    /// No response was received.
    TransportFailure(HttpError),
}

impl ApiOutcome {
    /// Returns true for [`ApiOutcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Classifies a received response by its JSON body.
///
/// The HTTP status does not decide the outcome: Last.fm reports failures in
/// the body, often alongside a 4xx/5xx status.
#[must_use]
pub fn classify(response: &HttpResponse) -> ApiOutcome {
    let body: Value = match serde_json::from_slice(&response.body) {
        Ok(body) => body,
        Err(source) => {
            return ApiOutcome::FatalFailure(UpstreamError::InvalidResponse {
                status: response.status,
                source,
            });
        }
    };

    let error = match body.get("error") {
        Some(error) if is_set(error) => error,
        _ => return ApiOutcome::Success(ApiResponse::from_body(body)),
    };

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();

    match error.as_i64() {
        Some(code) if RetryPolicy::is_retryable_code(code) => {
            ApiOutcome::RetryableFailure { code, message }
        }
        Some(code) => ApiOutcome::FatalFailure(UpstreamError::Api { code, message }),
        None => ApiOutcome::FatalFailure(UpstreamError::UnexpectedError {
            error: error.to_string(),
            message,
        }),
    }
}

/// Returns true if an `error` field signals failure: anything but null,
/// `false`, zero or the empty string.
fn is_set(error: &Value) -> bool {
    match error {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads `scrobbles["@attr"].ignored`, which Last.fm sends as a number or a
/// numeric string.
fn ignored_count(body: &Value) -> u64 {
    match body.pointer("/scrobbles/@attr/ignored") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}
