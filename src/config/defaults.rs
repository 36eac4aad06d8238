//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

/// Default listen address.
pub const LISTEN: &str = "0.0.0.0:3000";

/// Default webhook path.
pub const PATH: &str = crate::webhook::DEFAULT_WEBHOOK_PATH;

/// Default Last.fm API endpoint.
pub const LASTFM_URL: &str = crate::lastfm::DEFAULT_API_URL;

/// Default per-request timeout for Last.fm calls in seconds.
pub const LASTFM_TIMEOUT_SECS: u64 = 10;

/// Default maximum number of attempts per Last.fm call.
pub const RETRY_MAX_ATTEMPTS: u32 = 5;

/// Default delay between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 2000;
