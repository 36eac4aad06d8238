//! Retry policy for Last.fm calls.

use std::time::Duration;

/// Configuration for fixed-delay retry behavior.
///
/// Controls how many times a call is attempted when Last.fm answers with a
/// transient error code, and how long to wait between attempts. The delay is
/// constant; there is no backoff.
///
/// # Defaults
///
/// - `max_attempts`: 5
/// - `delay`: 2 seconds
///
/// # Example
///
/// ```
/// use scrobble_relay::lastfm::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .with_max_attempts(3)
///     .with_delay(Duration::from_millis(500));
/// assert!(policy.should_retry(2));
/// assert!(!policy.should_retry(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    ///
    /// A value of 1 means no retries; only the initial attempt is made.
    pub max_attempts: u32,

    /// Delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Default maximum attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

    /// Default delay between attempts (2 seconds).
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

    /// Minimum value for `max_attempts`.
    pub const MIN_MAX_ATTEMPTS: u32 = 1;

    /// Last.fm error codes that signal a transient server-side condition:
    /// 11 (service offline) and 16 (temporary processing error).
    pub const RETRYABLE_ERROR_CODES: [i64; 2] = [11, 16];

    /// Creates a new retry policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            delay: Self::DEFAULT_DELAY,
        }
    }

    /// Sets the maximum number of attempts.
    ///
    /// # Panics
    ///
    /// Panics if `max_attempts` is less than 1.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        assert!(
            max_attempts >= Self::MIN_MAX_ATTEMPTS,
            "max_attempts must be at least 1"
        );
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay between attempts.
    ///
    /// Zero delay is supported (useful for testing with [`InstantSleeper`])
    /// but not recommended for production as it creates a tight retry loop.
    ///
    /// [`InstantSleeper`]: crate::time::InstantSleeper
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns true if another attempt may follow the given one.
    ///
    /// `attempt` is 1-based: 1 is the initial attempt.
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Returns true if a Last.fm error code is worth retrying.
    #[must_use]
    pub fn is_retryable_code(code: i64) -> bool {
        Self::RETRYABLE_ERROR_CODES.contains(&code)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
