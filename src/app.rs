//! Wiring: builds the webhook router and its collaborators from config.

use std::sync::Arc;

use axum::Router;

use crate::aqi::WaqiClient;
use crate::channels::{LineChannel, WebhookState, webhook_routes};
use crate::config::AppConfig;
use crate::error::Result;
use crate::intake::{IntakeMachine, SessionStore};

/// The assembled service.
pub struct App {
    pub router: Router,
    pub store: Arc<SessionStore>,
}

/// Build the service: session store, AQI client, LINE client, state machine
/// and routes.
pub fn build(config: &AppConfig) -> Result<App> {
    let store = SessionStore::new(config.session_idle_timeout);
    let aqi = Arc::new(WaqiClient::new(
        &config.aqicn_base_url,
        config.aqicn_token.clone(),
        config.aqi_timeout,
    )?);
    let messenger = Arc::new(LineChannel::new(
        &config.line_api_base_url,
        config.channel_access_token.clone(),
    ));
    let machine = Arc::new(IntakeMachine::new(Arc::clone(&store), aqi));

    let router = webhook_routes(WebhookState {
        machine,
        messenger,
        channel_secret: config.channel_secret.clone(),
    });

    Ok(App { router, store })
}
