//! Error types for the intake bot.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("AQI error: {0}")]
    Aqi(#[from] AqiError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Messaging channel errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),

    #[error("Authentication failed for channel {name}: {reason}")]
    AuthFailed { name: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Air-quality lookup errors. Never surfaced to users; the state machine
/// treats every variant as "no reading".
#[derive(Debug, thiserror::Error)]
pub enum AqiError {
    #[error("AQI request for {city} failed: {reason}")]
    RequestFailed { city: String, reason: String },

    #[error("AQI provider returned status {status:?} for {city}")]
    BadStatus { city: String, status: Option<String> },

    #[error("Invalid AQI response for {city}: {reason}")]
    InvalidResponse { city: String, reason: String },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
