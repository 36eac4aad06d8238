//! Outbound Last.fm API layer.
//!
//! This module provides:
//! - Request signing ([`api_signature`])
//! - Signed request parameters ([`ApiRequestParams`], [`SignedPayload`])
//! - HTTP request/response types and client trait ([`HttpRequest`],
//!   [`HttpResponse`], [`HttpClient`]) with a reqwest implementation
//!   ([`ReqwestClient`])
//! - Response classification ([`ApiOutcome`])
//! - The retrying client ([`LastFmClient`], [`ScrobbleApi`]) and its
//!   [`RetryPolicy`]

mod client;
mod error;
mod http;
mod params;
mod response;
mod retry;
mod scrobbler;
mod signature;

#[cfg(test)]
mod scrobbler_tests;

pub use client::{DEFAULT_REQUEST_TIMEOUT, ReqwestClient, USER_AGENT};
pub use error::{HttpError, UpstreamError};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use params::{ApiMethod, ApiRequestParams, LastFmCredentials, SignedPayload};
pub use response::{ApiOutcome, ApiResponse, classify};
pub use retry::RetryPolicy;
pub use scrobbler::{DEFAULT_API_URL, LastFmClient, ScrobbleApi};
pub use signature::api_signature;
