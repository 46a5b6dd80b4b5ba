//! Webhook server: receives LINE events and answers them through the
//! intake state machine.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::{ExposeSecret, SecretString};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use super::Messenger;
use super::line::{SIGNATURE_HEADER, parse_webhook, verify_signature};
use crate::intake::IntakeMachine;

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    pub machine: Arc<IntakeMachine>,
    pub messenger: Arc<dyn Messenger>,
    pub channel_secret: SecretString,
}

/// Build the webhook router.
pub fn webhook_routes(state: WebhookState) -> Router {
    Router::new()
        .route("/callback", post(callback))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health(State(state): State<WebhookState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "asthma-intake",
        "active_sessions": state.machine.store().len().await,
    }))
}

// ── Callback ────────────────────────────────────────────────────────────

/// POST /callback
///
/// Rejects bad signatures and unparseable bodies with 400. Otherwise every
/// text message in the batch is handled in order and answered; failures to
/// deliver a reply are logged and the batch is still acknowledged with 200.
async fn callback(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = verify_signature(state.channel_secret.expose_secret(), signature, &body) {
        warn!(error = %e, "Rejected webhook");
        return (StatusCode::BAD_REQUEST, "invalid signature");
    }

    let payload = match parse_webhook(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Malformed webhook body");
            return (StatusCode::BAD_REQUEST, "invalid body");
        }
    };

    for event in &payload.events {
        let Some(text_event) = event.as_text() else {
            debug!(kind = %event.kind, "Ignoring non-text event");
            continue;
        };

        let reply = state
            .machine
            .handle(&text_event.user_id, &text_event.text)
            .await;

        if let Err(e) = state
            .messenger
            .reply(&text_event.reply_token, &reply)
            .await
        {
            warn!(
                channel = state.messenger.name(),
                user_id = %text_event.user_id,
                error = %e,
                "Failed to send reply"
            );
        }
    }

    (StatusCode::OK, "OK")
}
