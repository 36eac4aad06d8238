//! Scrobble relay
//!
//! A library for receiving Plex webhook notifications and relaying music
//! playback to Last.fm as now-playing updates and scrobbles.

pub mod config;
pub mod dispatch;
pub mod lastfm;
pub mod notification;
pub mod time;
pub mod webhook;
