//! Messaging channels: inbound webhook and outbound replies.

pub mod line;
pub mod webhook;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::intake::Reply;

pub use line::LineChannel;
pub use webhook::{WebhookState, webhook_routes};

/// Delivers a reply to the user who sent an inbound event.
#[async_trait]
pub trait Messenger: Send + Sync {
    fn name(&self) -> &str;

    /// Send `reply` using the one-shot token from the inbound event.
    async fn reply(&self, reply_token: &str, reply: &Reply) -> Result<(), ChannelError>;
}
