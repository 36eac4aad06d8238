//! CLI argument parsing using clap.
//!
//! Credentials may also come from the environment variables named on each
//! option, which is how they are usually supplied in deployment.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Scrobble relay
///
/// Receives Plex webhook notifications and relays music playback to Last.fm
/// as now-playing updates and scrobbles.
#[derive(Debug, Parser)]
#[command(name = "scrobble-relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Address to listen on, e.g. 0.0.0.0:3000
    #[arg(long, env = "RELAY_LISTEN")]
    pub listen: Option<String>,

    /// Path of the webhook endpoint
    #[arg(long)]
    pub path: Option<String>,

    /// Key callers must pass in the `apiKey` query parameter
    #[arg(long = "webhook-key", env = "WEBHOOK_API_KEY", hide_env_values = true)]
    pub webhook_key: Option<String>,

    /// Last.fm application API key
    #[arg(long = "lastfm-api-key", env = "LAST_FM_API_KEY", hide_env_values = true)]
    pub lastfm_api_key: Option<String>,

    /// Last.fm application shared secret
    #[arg(long = "lastfm-secret", env = "LAST_FM_SHARED_SECRET", hide_env_values = true)]
    pub lastfm_secret: Option<String>,

    /// Last.fm session key of the scrobbling user
    #[arg(
        long = "lastfm-session-key",
        env = "LAST_FM_SESSION_KEY",
        hide_env_values = true
    )]
    pub lastfm_session_key: Option<String>,

    /// Last.fm API endpoint
    #[arg(long = "lastfm-url")]
    pub lastfm_url: Option<String>,

    /// Seconds before a single Last.fm request is abandoned
    #[arg(long = "lastfm-timeout-secs")]
    pub lastfm_timeout_secs: Option<u64>,

    /// Maximum number of attempts per Last.fm call
    #[arg(long = "retry-max")]
    pub retry_max: Option<u32>,

    /// Delay between attempts in milliseconds
    #[arg(long = "retry-delay-ms")]
    pub retry_delay_ms: Option<u64>,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for scrobble-relay
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "scrobble-relay.toml")]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }
}

#[cfg(test)]
impl Cli {
    /// The command definition with every environment fallback removed.
    pub(crate) fn command_without_env() -> clap::Command {
        use clap::CommandFactory;

        Self::command().mut_args(|arg| arg.env(None::<&'static str>))
    }

    /// Parses arguments as [`Cli::parse_from_iter`] does, but ignores the
    /// process environment so results do not depend on exported secrets.
    pub(crate) fn parse_from_iter_ignoring_env<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        use clap::FromArgMatches;

        let matches = Self::command_without_env().get_matches_from(iter);
        Self::from_arg_matches(&matches).unwrap()
    }
}
