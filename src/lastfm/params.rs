//! Request parameters for the two Last.fm write methods.

use std::fmt;

use super::HttpRequest;
use super::signature::api_signature;
use crate::notification::TrackInfo;

/// The Last.fm methods this relay calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    /// `track.updateNowPlaying`
    UpdateNowPlaying,
    /// `track.scrobble`
    Scrobble,
}

impl ApiMethod {
    /// Returns the method name as sent in the `method` parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpdateNowPlaying => "track.updateNowPlaying",
            Self::Scrobble => "track.scrobble",
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials for an authenticated Last.fm session.
///
/// `Debug` redacts the secret and the session key.
#[derive(Clone, PartialEq, Eq)]
pub struct LastFmCredentials {
    /// Application API key
    pub api_key: String,
    /// Application shared secret, used only for signing
    pub shared_secret: String,
    /// User session key (`sk`)
    pub session_key: String,
}

impl LastFmCredentials {
    /// Creates a credential set.
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        shared_secret: impl Into<String>,
        session_key: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            shared_secret: shared_secret.into(),
            session_key: session_key.into(),
        }
    }
}

impl fmt::Debug for LastFmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LastFmCredentials")
            .field("api_key", &self.api_key)
            .field("shared_secret", &"<redacted>")
            .field("session_key", &"<redacted>")
            .finish()
    }
}

/// The unsigned parameters of one call attempt, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequestParams {
    params: Vec<(&'static str, String)>,
}

impl ApiRequestParams {
    /// Assembles the parameters for `method` on `track`.
    #[must_use]
    pub fn new(
        method: ApiMethod,
        track: &TrackInfo,
        timestamp: u64,
        credentials: &LastFmCredentials,
    ) -> Self {
        Self {
            params: vec![
                ("method", method.as_str().to_string()),
                ("artist", track.artist.clone()),
                ("track", track.track.clone()),
                ("album", track.album.clone()),
                ("timestamp", timestamp.to_string()),
                ("api_key", credentials.api_key.clone()),
                ("sk", credentials.session_key.clone()),
            ],
        }
    }

    /// Returns the value of a parameter, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over the parameters in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Signs the parameters with the shared secret.
    #[must_use]
    pub fn sign(self, secret: &str) -> SignedPayload {
        let api_sig = api_signature(self.iter(), secret);
        SignedPayload {
            params: self,
            api_sig,
        }
    }
}

/// Signed parameters, ready to be sent once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    params: ApiRequestParams,
    api_sig: String,
}

impl SignedPayload {
    /// Response format requested from Last.fm.
    pub const FORMAT: &'static str = "json";

    /// Returns the computed signature.
    #[must_use]
    pub fn api_sig(&self) -> &str {
        &self.api_sig
    }

    /// Builds the form-encoded POST request for `endpoint`.
    ///
    /// `api_sig` and `format` follow the signed parameters.
    #[must_use]
    pub fn into_request(self, endpoint: url::Url) -> HttpRequest {
        let pairs = self
            .params
            .iter()
            .chain([("api_sig", self.api_sig.as_str()), ("format", Self::FORMAT)]);

        HttpRequest::post(endpoint).with_form(pairs)
    }
}
