//! Mapping of Plex events to Last.fm calls.

use crate::notification::NotificationEnvelope;

/// What to do with a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send a now-playing update.
    CallNowPlaying,
    /// Submit a scrobble.
    CallScrobble,
    /// Accept and drop the notification.
    Ignore,
    /// Accept and report an event type this relay does not know.
    UnhandledEvent(String),
}

/// Classifies a notification.
///
/// Only track media is relayed. Play and resume become now-playing updates,
/// `media.scrobble` becomes a scrobble, pause and stop are dropped. Anything
/// else is reported as unhandled. No state is kept between calls, so
/// repeated plays each produce an update.
#[must_use]
pub fn dispatch(envelope: &NotificationEnvelope) -> Action {
    if !envelope.is_track() {
        return Action::Ignore;
    }

    match envelope.event.as_str() {
        "media.play" | "media.resume" => Action::CallNowPlaying,
        "media.scrobble" => Action::CallScrobble,
        "media.pause" | "media.stop" => Action::Ignore,
        other => Action::UnhandledEvent(other.to_string()),
    }
}
