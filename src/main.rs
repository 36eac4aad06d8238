//! Scrobble relay
//!
//! `scrobble-relay init` writes a configuration template. Any other
//! invocation loads the configuration and serves the Plex webhook until
//! Ctrl+C or SIGTERM.

use std::path::Path;
use std::process::ExitCode;

use scrobble_relay::config::{Cli, Command, ValidatedConfig, write_default_config};

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it only routes to the functions below.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match &cli.command {
        Some(Command::Init { output }) => write_template(output),
        None => match ValidatedConfig::load(&cli) {
            Ok(config) => serve(config),
            Err(e) => {
                eprintln!("Configuration error: {e}");
                print_config_hint(&e);
                exit_code::CONFIG_ERROR
            }
        },
    }
}

/// Writes the commented configuration template for `init`.
fn write_template(output: &Path) -> ExitCode {
    if let Err(e) = write_default_config(output) {
        eprintln!("Error: {e}");
        return exit_code::CONFIG_ERROR;
    }

    println!("Configuration template written to: {}", output.display());
    println!("Fill in the [webhook] and [lastfm] keys, then run:");
    println!("  scrobble-relay --config {}", output.display());
    exit_code::SUCCESS
}

/// Serves the webhook on a multi-threaded runtime until shutdown.
///
/// Excluded from coverage - requires async runtime and a real socket.
#[cfg(not(tarpaulin_include))]
fn serve(config: ValidatedConfig) -> ExitCode {
    setup_tracing(config.verbose);
    tracing::info!(
        "{} v{} relaying POST {} to {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.path,
        config.api_url,
    );
    tracing::info!("{config}");

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    match runtime.block_on(run::execute(config)) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("Relay stopped: {e}");
            exit_code::runtime_error()
        }
    }
}
