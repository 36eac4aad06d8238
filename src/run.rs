//! Application execution logic.
//!
//! This module wires the Last.fm client and the webhook handler into an
//! HTTP server and runs it until a shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;

use scrobble_relay::config::ValidatedConfig;
use scrobble_relay::lastfm::{HttpError, LastFmClient, ReqwestClient};
use scrobble_relay::webhook::{WebhookHandler, router};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to bind the listen address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address that could not be bound
        addr: SocketAddr,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The outbound HTTP client could not be built.
    #[error("Failed to set up Last.fm client: {0}")]
    HttpClient(#[source] HttpError),

    /// The server stopped with an I/O error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Runs the relay until shutdown signal (Ctrl+C or SIGTERM).
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, the listen address
/// cannot be bound, or the server fails while running.
///
/// Excluded from coverage - requires a real socket and signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let app = build_app(&config)?;

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|source| RunError::Bind {
            addr: config.listen,
            source,
        })?;

    let local_addr = listener.local_addr().unwrap_or(config.listen);
    tracing::info!("Listening on http://{local_addr}{}", config.path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(RunError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Builds the router with the production Last.fm client.
fn build_app(config: &ValidatedConfig) -> Result<Router, RunError> {
    let http = ReqwestClient::new(config.request_timeout).map_err(RunError::HttpClient)?;
    let client = LastFmClient::new(http, config.credentials.clone())
        .with_endpoint(config.api_url.clone())
        .with_retry_policy(config.retry_policy);

    let handler = Arc::new(WebhookHandler::new(client, config.webhook_key.clone()));

    Ok(router(handler, &config.path))
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
///
/// A handler that fails to install never resolves, leaving the other one active.
///
/// Excluded from coverage - requires signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("Shutdown signal received, stopping server");
}
