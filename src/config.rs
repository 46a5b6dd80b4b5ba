//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default WAQI endpoint.
pub const DEFAULT_AQICN_BASE_URL: &str = "https://api.waqi.info";

/// Default LINE Messaging API endpoint.
pub const DEFAULT_LINE_API_BASE_URL: &str = "https://api.line.me";

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// LINE channel access token (bearer for the reply API).
    pub channel_access_token: SecretString,
    /// LINE channel secret (webhook signature key).
    pub channel_secret: SecretString,
    /// WAQI API token.
    pub aqicn_token: SecretString,
    /// Port the webhook server listens on.
    pub port: u16,
    /// Sessions idle longer than this are dropped.
    pub session_idle_timeout: Duration,
    /// How often the expiry sweep runs.
    pub sweep_interval: Duration,
    /// Per-request timeout for AQI lookups.
    pub aqi_timeout: Duration,
    pub aqicn_base_url: String,
    pub line_api_base_url: String,
}

impl AppConfig {
    /// Build the configuration from the process environment.
    ///
    /// The three secrets are required. Numeric settings fall back to their
    /// defaults when missing or unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = |key: &str| -> Result<SecretString, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(SecretString::from)
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };
        let number = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };

        let port = lookup("INTAKE_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(8080);

        Ok(Self {
            channel_access_token: secret("CHANNEL_ACCESS_TOKEN")?,
            channel_secret: secret("CHANNEL_SECRET")?,
            aqicn_token: secret("AQICN_API")?,
            port,
            session_idle_timeout: Duration::from_secs(
                number("INTAKE_SESSION_IDLE_MIN", 30).saturating_mul(60),
            ),
            sweep_interval: Duration::from_secs(number("INTAKE_SWEEP_INTERVAL_SECS", 60).max(1)),
            aqi_timeout: Duration::from_secs(number("AQICN_TIMEOUT_SECS", 10)),
            aqicn_base_url: lookup("AQICN_BASE_URL")
                .unwrap_or_else(|| DEFAULT_AQICN_BASE_URL.to_string()),
            line_api_base_url: lookup("LINE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LINE_API_BASE_URL.to_string()),
        })
    }
}
