//! Inbound media-server notifications.
//!
//! Plex posts a multipart form whose `payload` field is a JSON document. Only
//! a handful of its fields matter here: the event name, the media type, and
//! the three titles that identify a music track.

use serde::Deserialize;
use thiserror::Error;

/// Media type that Plex reports for music tracks.
pub const TRACK_MEDIA_TYPE: &str = "track";

/// The track identity sent to Last.fm.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackInfo {
    /// Track title (`Metadata.title`)
    pub track: String,
    /// Artist name (`Metadata.grandparentTitle`)
    pub artist: String,
    /// Album title (`Metadata.parentTitle`)
    pub album: String,
}

impl TrackInfo {
    /// Creates track info from its three titles.
    #[must_use]
    pub fn new(
        track: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            track: track.into(),
            artist: artist.into(),
            album: album.into(),
        }
    }
}

/// A parsed webhook notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEnvelope {
    /// Plex event name, e.g. `media.scrobble`
    pub event: String,
    /// Plex media type, e.g. `track` or `episode`
    pub metadata_type: String,
    /// Track titles. For non-track media, absent titles are left empty.
    pub track_info: TrackInfo,
}

/// Error type for malformed notification payloads.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The multipart body could not be read.
    #[error("Failed to read multipart body: {0}")]
    Multipart(String),

    /// The multipart body has no `payload` field.
    #[error("Missing 'payload' form field")]
    MissingPayload,

    /// The payload is not valid JSON or has the wrong shape.
    #[error("Invalid payload JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field required for the notification's media type is missing.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Deserialize)]
struct RawNotification {
    event: Option<String>,
    #[serde(rename = "Metadata")]
    metadata: Option<RawMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    grandparent_title: Option<String>,
    parent_title: Option<String>,
}

impl NotificationEnvelope {
    /// Parses the JSON carried in the `payload` form field.
    ///
    /// `event`, `Metadata` and `Metadata.type` are always required. The
    /// three titles are required only when the media type is `track`.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] if the JSON is malformed or a required field
    /// is missing.
    pub fn parse(payload: &str) -> Result<Self, PayloadError> {
        let raw: RawNotification = serde_json::from_str(payload)?;

        let event = raw.event.ok_or(PayloadError::MissingField("event"))?;
        let metadata = raw.metadata.ok_or(PayloadError::MissingField("Metadata"))?;
        let metadata_type = metadata
            .kind
            .ok_or(PayloadError::MissingField("Metadata.type"))?;

        let track_info = if metadata_type == TRACK_MEDIA_TYPE {
            TrackInfo {
                track: metadata
                    .title
                    .ok_or(PayloadError::MissingField("Metadata.title"))?,
                artist: metadata
                    .grandparent_title
                    .ok_or(PayloadError::MissingField("Metadata.grandparentTitle"))?,
                album: metadata
                    .parent_title
                    .ok_or(PayloadError::MissingField("Metadata.parentTitle"))?,
            }
        } else {
            TrackInfo {
                track: metadata.title.unwrap_or_default(),
                artist: metadata.grandparent_title.unwrap_or_default(),
                album: metadata.parent_title.unwrap_or_default(),
            }
        };

        Ok(Self {
            event,
            metadata_type,
            track_info,
        })
    }

    /// Returns true if the notification describes a music track.
    #[must_use]
    pub fn is_track(&self) -> bool {
        self.metadata_type == TRACK_MEDIA_TYPE
    }
}
