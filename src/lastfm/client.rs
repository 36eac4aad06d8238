//! Outbound HTTP for Last.fm calls, backed by reqwest.

use std::time::Duration;

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// `User-Agent` sent with every Last.fm call.
///
/// Last.fm asks API clients to identify themselves.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [`HttpClient`] used in production.
///
/// Every request carries [`USER_AGENT`] and is abandoned after the configured
/// timeout, so a hung upstream surfaces as [`HttpError::Timeout`] rather than
/// holding the webhook request open.
///
/// # Example
///
/// ```no_run
/// use scrobble_relay::lastfm::{DEFAULT_REQUEST_TIMEOUT, HttpClient, HttpRequest, ReqwestClient};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::new(DEFAULT_REQUEST_TIMEOUT)?;
/// let url = Url::parse("https://ws.audioscrobbler.com/2.0/")?;
/// let response = client
///     .request(HttpRequest::post(url).with_form([("format", "json")]))
///     .await?;
/// println!("Last.fm answered {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Builds a client with the relay's user agent and the given timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Setup`] if reqwest cannot initialize its TLS
    /// backend or resolver.
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Setup(Box::new(e)))?;

        Ok(Self::from_client(inner))
    }

    /// Wraps an already configured reqwest client as is.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { inner: client }
    }
}

/// Maps a reqwest failure onto the transport error taxonomy.
fn transport_error(error: reqwest::Error) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout
    } else if error.is_builder() {
        HttpError::InvalidUrl(error.to_string())
    } else {
        HttpError::Connection(Box::new(error))
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = req;

        let mut builder = self.inner.request(method, url.as_str()).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        // The timeout also covers reading the body.
        let body = response.bytes().await.map_err(transport_error)?.to_vec();

        Ok(HttpResponse::new(status, headers, body))
    }
}
