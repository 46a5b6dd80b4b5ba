//! Air-quality lookups against the WAQI (aqicn.org) feed API.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::AqiError;

/// Resolves a city to its current air-quality index.
#[async_trait]
pub trait AqiProvider: Send + Sync {
    /// Current AQI for `city`, or `None` when no reading is available.
    /// Implementations must not fail past this boundary.
    async fn current_aqi(&self, city: &str) -> Option<i64>;
}

/// `GET {base}/feed/{city}/?token=...` response body. `data` is an object
/// when `status == "ok"` and an error string otherwise; `aqi` can be `"-"`
/// for stations without a reading.
#[derive(Debug, Deserialize)]
struct FeedResponse {
    status: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

/// WAQI HTTP client.
pub struct WaqiClient {
    base_url: String,
    token: SecretString,
    client: reqwest::Client,
}

impl WaqiClient {
    pub fn new(base_url: &str, token: SecretString, timeout: Duration) -> Result<Self, AqiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AqiError::RequestFailed {
                city: String::new(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn feed_url(&self, city: &str) -> String {
        format!("{}/feed/{city}/", self.base_url)
    }

    /// Fetch the AQI for `city`, surfacing why a reading is missing.
    pub async fn fetch(&self, city: &str) -> Result<i64, AqiError> {
        let request_failed = |e: reqwest::Error| AqiError::RequestFailed {
            city: city.to_string(),
            reason: e.to_string(),
        };

        let body: FeedResponse = self
            .client
            .get(self.feed_url(city))
            .query(&[("token", self.token.expose_secret())])
            .send()
            .await
            .map_err(request_failed)?
            .json()
            .await
            .map_err(|e| AqiError::InvalidResponse {
                city: city.to_string(),
                reason: e.to_string(),
            })?;

        if body.status.as_deref() != Some("ok") {
            return Err(AqiError::BadStatus {
                city: city.to_string(),
                status: body.status,
            });
        }

        body.data
            .get("aqi")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| AqiError::InvalidResponse {
                city: city.to_string(),
                reason: format!("data.aqi is not an integer: {}", body.data["aqi"]),
            })
    }
}

#[async_trait]
impl AqiProvider for WaqiClient {
    async fn current_aqi(&self, city: &str) -> Option<i64> {
        match self.fetch(city).await {
            Ok(aqi) => Some(aqi),
            Err(e) => {
                tracing::warn!(city = %city, error = %e, "AQI lookup failed");
                None
            }
        }
    }
}
