//! Scrobbling trait and the retrying Last.fm client.

use crate::notification::TrackInfo;
use crate::time::{Clock, Sleeper, SystemClock, TokioSleeper};

use super::response::classify;
use super::{
    ApiMethod, ApiOutcome, ApiRequestParams, HttpClient, LastFmCredentials, RetryPolicy,
    UpstreamError,
};

/// Default Last.fm API endpoint.
pub const DEFAULT_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// Trait for submitting track activity to a scrobbling service.
///
/// Implementations handle retries internally and resolve to a terminal
/// [`ApiOutcome`]; callers never see [`ApiOutcome::RetryableFailure`].
pub trait ScrobbleApi: Send + Sync {
    /// Calls `method` for `track`, waiting until the outcome is terminal.
    fn execute(
        &self,
        method: ApiMethod,
        track: &TrackInfo,
    ) -> impl std::future::Future<Output = ApiOutcome> + Send;
}

/// Last.fm client with signing and fixed-delay retry.
///
/// Each attempt reads the clock again and re-signs, so a retried call never
/// carries a stale timestamp.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper used between attempts (defaults to [`TokioSleeper`])
/// - `C`: The clock used for timestamps (defaults to [`SystemClock`])
///
/// # Example
///
/// ```
/// use scrobble_relay::lastfm::{
///     DEFAULT_REQUEST_TIMEOUT, LastFmClient, LastFmCredentials, ReqwestClient,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = LastFmClient::new(
///     ReqwestClient::new(DEFAULT_REQUEST_TIMEOUT)?,
///     LastFmCredentials::new("api-key", "secret", "session-key"),
/// );
/// assert_eq!(client.endpoint().as_str(), "https://ws.audioscrobbler.com/2.0/");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LastFmClient<H, S = TokioSleeper, C = SystemClock> {
    client: H,
    sleeper: S,
    clock: C,
    endpoint: url::Url,
    credentials: LastFmCredentials,
    retry_policy: RetryPolicy,
}

impl<H> LastFmClient<H, TokioSleeper, SystemClock> {
    /// Creates a client for the public Last.fm endpoint with the default
    /// retry policy, [`TokioSleeper`] and [`SystemClock`].
    ///
    /// # Panics
    ///
    /// Never in practice: [`DEFAULT_API_URL`] is a valid URL.
    #[must_use]
    pub fn new(client: H, credentials: LastFmCredentials) -> Self {
        let endpoint = url::Url::parse(DEFAULT_API_URL).expect("default API URL is valid");

        Self {
            client,
            sleeper: TokioSleeper,
            clock: SystemClock,
            endpoint,
            credentials,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl<H, S, C> LastFmClient<H, S, C> {
    /// Sets a custom sleeper for retry delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> LastFmClient<H, S2, C> {
        LastFmClient {
            client: self.client,
            sleeper,
            clock: self.clock,
            endpoint: self.endpoint,
            credentials: self.credentials,
            retry_policy: self.retry_policy,
        }
    }

    /// Sets a custom clock for request timestamps.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> LastFmClient<H, S, C2> {
        LastFmClient {
            client: self.client,
            sleeper: self.sleeper,
            clock,
            endpoint: self.endpoint,
            credentials: self.credentials,
            retry_policy: self.retry_policy,
        }
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: url::Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Returns the configured endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}

impl<H: HttpClient, S: Sleeper, C: Clock> LastFmClient<H, S, C> {
    /// Executes a single attempt with a fresh timestamp.
    async fn attempt(&self, method: ApiMethod, track: &TrackInfo) -> ApiOutcome {
        let request = ApiRequestParams::new(
            method,
            track,
            self.clock.unix_seconds(),
            &self.credentials,
        )
        .sign(&self.credentials.shared_secret)
        .into_request(self.endpoint.clone());

        let response = match self.client.request(request).await {
            Ok(response) => response,
            Err(e) => return ApiOutcome::TransportFailure(e),
        };

        if !response.is_success() {
            tracing::warn!(
                status = %response.status,
                body = response.body_text().unwrap_or("<binary>"),
                "Last.fm returned a non-OK status"
            );
        }

        classify(&response)
    }

    /// Runs attempts until a terminal outcome or the attempt bound.
    async fn execute_with_retry(&self, method: ApiMethod, track: &TrackInfo) -> ApiOutcome {
        let max_attempts = self.retry_policy.max_attempts;
        let mut attempt = 1;

        loop {
            match self.attempt(method, track).await {
                ApiOutcome::RetryableFailure { code, message } => {
                    if !self.retry_policy.should_retry(attempt) {
                        return ApiOutcome::FatalFailure(UpstreamError::RetriesExhausted {
                            attempts: attempt,
                            code,
                            message,
                        });
                    }

                    tracing::warn!(
                        %method,
                        code,
                        %message,
                        "Last.fm error, retrying attempt {}/{} in {}ms",
                        attempt + 1,
                        max_attempts,
                        self.retry_policy.delay.as_millis(),
                    );
                    self.sleeper.sleep(self.retry_policy.delay).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }
}

impl<H: HttpClient, S: Sleeper, C: Clock> ScrobbleApi for LastFmClient<H, S, C> {
    async fn execute(&self, method: ApiMethod, track: &TrackInfo) -> ApiOutcome {
        let outcome = self.execute_with_retry(method, track).await;

        match &outcome {
            ApiOutcome::Success(response) => {
                if response.ignored > 0 {
                    tracing::warn!(
                        %method,
                        ignored = response.ignored,
                        details = %response.body["scrobbles"],
                        "Last.fm ignored scrobbles"
                    );
                }
                tracing::info!(
                    "Last.fm method '{method}' successful for: {} - {}",
                    track.artist,
                    track.track
                );
            }
            ApiOutcome::FatalFailure(e) => {
                tracing::error!(%method, "Error during Last.fm request: {e}");
            }
            ApiOutcome::TransportFailure(e) => {
                tracing::error!(%method, "Failed to reach Last.fm: {e}");
            }
            ApiOutcome::RetryableFailure { .. } => {}
        }

        outcome
    }
}
