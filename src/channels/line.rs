//! LINE channel: webhook payloads, signature checks and the reply API.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::channels::Messenger;
use crate::error::ChannelError;
use crate::intake::Reply;

/// Header carrying the base64 HMAC-SHA256 of the request body.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// LINE rejects quick-reply labels longer than this.
const MAX_QUICK_REPLY_LABEL: usize = 20;

// ── Webhook payload ─────────────────────────────────────────────────────

/// Body of a webhook POST: a batch of events.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// A text message event with everything needed to answer it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEvent {
    pub user_id: String,
    pub reply_token: String,
    pub text: String,
}

impl WebhookEvent {
    /// The event as a text message, or `None` for any other event kind.
    pub fn as_text(&self) -> Option<TextEvent> {
        if self.kind != "message" {
            return None;
        }
        let message = self.message.as_ref().filter(|m| m.kind == "text")?;
        Some(TextEvent {
            user_id: self.source.as_ref()?.user_id.clone()?,
            reply_token: self.reply_token.clone()?,
            text: message.text.clone()?,
        })
    }
}

/// Parse a webhook body.
pub fn parse_webhook(body: &[u8]) -> Result<WebhookBody, ChannelError> {
    serde_json::from_slice(body).map_err(|e| ChannelError::InvalidMessage(e.to_string()))
}

// ── Signature ───────────────────────────────────────────────────────────

/// Compute the signature LINE sends for `body`.
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC accepts keys of any size");
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

/// Check the `X-Line-Signature` header against `body` in constant time.
pub fn verify_signature(
    channel_secret: &str,
    signature_header: Option<&str>,
    body: &[u8],
) -> Result<(), ChannelError> {
    let auth_failed = |reason: &str| ChannelError::AuthFailed {
        name: "line".into(),
        reason: reason.to_string(),
    };

    let signature = signature_header.unwrap_or("").trim();
    if signature.is_empty() {
        return Err(auth_failed("missing signature"));
    }
    let Ok(signature_bytes) = BASE64.decode(signature) else {
        return Err(auth_failed("signature is not base64"));
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(channel_secret.as_bytes()) else {
        return Err(auth_failed("unusable channel secret"));
    };
    mac.update(body);
    mac.verify_slice(&signature_bytes)
        .map_err(|_| auth_failed("signature mismatch"))
}

// ── Reply API ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quick_reply: Option<QuickReplyBlock<'a>>,
}

#[derive(Debug, Serialize)]
struct QuickReplyBlock<'a> {
    items: Vec<QuickReplyItem<'a>>,
}

#[derive(Debug, Serialize)]
struct QuickReplyItem<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    action: MessageAction<'a>,
}

#[derive(Debug, Serialize)]
struct MessageAction<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    label: String,
    text: &'a str,
}

fn reply_request<'a>(reply_token: &'a str, reply: &'a Reply) -> ReplyRequest<'a> {
    let quick_reply = (!reply.quick_replies.is_empty()).then(|| QuickReplyBlock {
        items: reply
            .quick_replies
            .iter()
            .map(|q| QuickReplyItem {
                kind: "action",
                action: MessageAction {
                    kind: "message",
                    label: q.label.chars().take(MAX_QUICK_REPLY_LABEL).collect(),
                    text: &q.text,
                },
            })
            .collect(),
    });

    ReplyRequest {
        reply_token,
        messages: vec![TextMessage {
            kind: "text",
            text: &reply.text,
            quick_reply,
        }],
    }
}

/// LINE Messaging API client.
pub struct LineChannel {
    api_base: String,
    access_token: SecretString,
    client: reqwest::Client,
}

impl LineChannel {
    pub fn new(api_base: &str, access_token: SecretString) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v2/bot/{path}", self.api_base)
    }
}

#[async_trait]
impl Messenger for LineChannel {
    fn name(&self) -> &str {
        "line"
    }

    async fn reply(&self, reply_token: &str, reply: &Reply) -> Result<(), ChannelError> {
        let resp = self
            .client
            .post(self.api_url("message/reply"))
            .bearer_auth(self.access_token.expose_secret())
            .json(&reply_request(reply_token, reply))
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "line".into(),
                reason: format!("reply failed ({status}): {err}"),
            });
        }

        Ok(())
    }
}
