//! Axum routes for the webhook listener.

use std::sync::Arc;

use axum::Router;
use axum::extract::{FromRequest, Multipart, RawQuery, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

use crate::lastfm::ScrobbleApi;
use crate::notification::PayloadError;

use super::{HandlerResult, WebhookHandler};

/// Default path of the webhook endpoint.
pub const DEFAULT_WEBHOOK_PATH: &str = "/api/webhook";

/// Query parameter carrying the caller's key.
pub const API_KEY_PARAM: &str = "apiKey";

/// Multipart field carrying the notification JSON.
pub const PAYLOAD_FIELD: &str = "payload";

/// Builds the router: `POST <path>` for notifications and `GET /health`.
///
/// Other methods on the webhook path get a JSON 405.
pub fn router<A>(handler: Arc<WebhookHandler<A>>, path: &str) -> Router
where
    A: ScrobbleApi + 'static,
{
    Router::new()
        .route(path, post(receive::<A>).fallback(method_not_allowed))
        .route("/health", get(health))
        .with_state(handler)
}

async fn receive<A: ScrobbleApi>(
    State(handler): State<Arc<WebhookHandler<A>>>,
    RawQuery(query): RawQuery,
    request: Request,
) -> HandlerResult {
    let api_key = query.as_deref().and_then(api_key_from_query);

    handler
        .handle(api_key.as_deref(), read_payload(request))
        .await
}

async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method Not Allowed" })),
    )
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn api_key_from_query(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == API_KEY_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Reads the `payload` field from a multipart body.
async fn read_payload(request: Request) -> Result<String, PayloadError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| PayloadError::Multipart(e.to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PayloadError::Multipart(e.to_string()))?
    {
        if field.name() == Some(PAYLOAD_FIELD) {
            return field
                .text()
                .await
                .map_err(|e| PayloadError::Multipart(e.to_string()));
        }
    }

    Err(PayloadError::MissingPayload)
}

impl IntoResponse for HandlerResult {
    fn into_response(self) -> Response {
        match self.body {
            // 204 cannot carry a body on the wire.
            Some(body) if self.status != StatusCode::NO_CONTENT => {
                (self.status, Json(body)).into_response()
            }
            _ => self.status.into_response(),
        }
    }
}
