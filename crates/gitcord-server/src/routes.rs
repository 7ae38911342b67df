//! HTTP routes for the relay.

use crate::AppState;
use crate::signature::validate_signature;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use gitcord_core::build_embed;
use gitcord_proto::discord::WebhookBody;
use serde::Serialize;
use serde_json::Value;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the relay router.
pub fn relay_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/{hook_id}/{hook_token}", post(relay_webhook))
        .with_state(state)
}

/// The relay path: one GitHub delivery in, at most one Discord execution out.
async fn relay_webhook(
    State(state): State<AppState>,
    Path((hook_id, hook_token)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let Some(event) = header_str(&headers, "x-github-event") else {
        return (
            StatusCode::BAD_REQUEST,
            "Missing X-GitHub-Event header".to_string(),
        );
    };
    let Some(content_type) = header_str(&headers, header::CONTENT_TYPE.as_str()) else {
        return (
            StatusCode::BAD_REQUEST,
            "Missing content-type header".to_string(),
        );
    };

    if let Some(secret) = &state.config.webhook_secret {
        let signature = header_str(&headers, "x-hub-signature-256");
        if !validate_signature(secret, signature, &body) {
            tracing::warn!(event, "delivery failed signature validation");
            return (StatusCode::FORBIDDEN, "Invalid signature".to_string());
        }
    }

    let payload = match parse_payload(content_type, &body) {
        Ok(payload) => payload,
        Err(message) => return (StatusCode::BAD_REQUEST, message),
    };

    let embed = match build_embed(event, &payload, &state.config) {
        Ok(Some(embed)) => embed,
        Ok(None) => {
            tracing::debug!(event, "delivery produced no embed");
            return (StatusCode::OK, "Webhook NO-OP".to_string());
        }
        Err(err) => {
            tracing::warn!(event, error = %err, "could not build embed");
            return (StatusCode::BAD_REQUEST, err.to_string());
        }
    };

    let outbound = match &state.paste {
        Some(paste) if state.config.debug_paste => {
            let embed_json = serde_json::to_string(&embed).unwrap_or_default();
            match paste.upload(&embed_json).await {
                Ok(content) => WebhookBody::Content { content },
                Err(err) => {
                    tracing::warn!(error = %err, "debug paste upload failed, relaying embed");
                    embed
                }
            }
        }
        _ => embed,
    };

    match state
        .discord
        .execute_webhook(&hook_id, &hook_token, &outbound)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            format!("Successfully executed webhook {hook_id}"),
        ),
        Err(err) => {
            tracing::error!(hook_id = %hook_id, error = %err, "discord delivery failed");
            (StatusCode::BAD_REQUEST, err.to_string())
        }
    }
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Decode the delivery body. GitHub sends JSON directly or, for hooks
/// configured with the form content type, as the `payload` form field.
fn parse_payload(content_type: &str, body: &[u8]) -> Result<Value, String> {
    if content_type.contains("application/json") {
        return serde_json::from_slice(body).map_err(|err| format!("Invalid JSON payload: {err}"));
    }

    if content_type.contains("application/x-www-form-urlencoded") {
        let raw = url::form_urlencoded::parse(body)
            .find(|(key, _)| key == "payload")
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| "Missing payload form field".to_string())?;
        return serde_json::from_str(&raw).map_err(|err| format!("Invalid JSON payload: {err}"));
    }

    Err(format!("Unknown content type {content_type}"))
}
