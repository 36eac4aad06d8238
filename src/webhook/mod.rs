//! Inbound webhook layer.
//!
//! This module provides:
//! - Request orchestration ([`WebhookHandler`], [`HandlerResult`])
//! - The error taxonomy of a request ([`HandlerError`])
//! - Axum routes for the listener ([`router`])

mod error;
mod handler;
mod routes;


pub use error::HandlerError;
pub use handler::{HandlerResult, WebhookHandler};
pub use routes::{API_KEY_PARAM, DEFAULT_WEBHOOK_PATH, PAYLOAD_FIELD, router};
