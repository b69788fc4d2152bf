// src/upstream/mod.rs
// HTTP client for the two third-party APIs the dashboard proxies:
// exchange rates (USD base) and current weather by coordinates.

pub mod weather_code;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::StockroomConfig;
use crate::currency::ExchangeRates;

/// Connect timeout for upstream calls
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream {url} unreachable: {source}")]
    Unavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream {url} returned a non-JSON body: {source}")]
    InvalidResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("upstream {url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// An upstream reply, passed back to callers untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `current_weather` block of the forecast payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub weathercode: i64,
    #[serde(default)]
    pub windspeed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ForecastPayload {
    current_weather: CurrentWeather,
}

#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    exchange_rate_url: String,
    weather_url: String,
}

impl UpstreamClient {
    pub fn new(
        exchange_rate_url: impl Into<String>,
        weather_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .user_agent(concat!("stockroom/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build upstream HTTP client ({}); using defaults", e);
                Client::new()
            });

        Self {
            http,
            exchange_rate_url: exchange_rate_url.into(),
            weather_url: weather_url.into(),
        }
    }

    pub fn from_config(config: &StockroomConfig) -> Self {
        Self::new(
            config.exchange_rate_url.clone(),
            config.weather_url.clone(),
            config.upstream_timeout(),
        )
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<UpstreamResponse, UpstreamError> {
        debug!(url, ?query, "Calling upstream");

        let unavailable = |source: reqwest::Error| UpstreamError::Unavailable {
            url: url.to_string(),
            source,
        };

        let mut request = self.http.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await.map_err(unavailable)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(unavailable)?;

        let body: Value = serde_json::from_slice(&bytes).map_err(|source| {
            warn!(url, status, "Upstream returned a non-JSON body");
            UpstreamError::InvalidResponse {
                url: url.to_string(),
                source,
            }
        })?;

        if !(200..300).contains(&status) {
            warn!(url, status, "Upstream returned an error status");
        }

        Ok(UpstreamResponse { status, body })
    }

    /// Current USD-based rates, verbatim.
    pub async fn exchange_rates(&self) -> Result<UpstreamResponse, UpstreamError> {
        self.get_json(&self.exchange_rate_url, &[]).await
    }

    /// Current weather for the given coordinates, verbatim. Coordinates are
    /// forwarded exactly as received; the upstream decides whether they are valid.
    pub async fn weather(&self, lat: &str, lng: &str) -> Result<UpstreamResponse, UpstreamError> {
        self.get_json(
            &self.weather_url,
            &[("latitude", lat), ("longitude", lng), ("current_weather", "true")],
        )
        .await
    }

    /// Parsed rate table. Non-2xx replies are errors here, unlike the proxy path.
    pub async fn rate_table(&self) -> Result<ExchangeRates, UpstreamError> {
        let response = self.exchange_rates().await?;
        let url = &self.exchange_rate_url;
        if !response.is_success() {
            return Err(UpstreamError::Status {
                url: url.clone(),
                status: response.status,
            });
        }
        serde_json::from_value(response.body).map_err(|source| UpstreamError::InvalidResponse {
            url: url.clone(),
            source,
        })
    }

    pub async fn current_weather(&self, lat: f64, lng: f64) -> Result<CurrentWeather, UpstreamError> {
        let response = self.weather(&lat.to_string(), &lng.to_string()).await?;
        let url = &self.weather_url;
        if !response.is_success() {
            return Err(UpstreamError::Status {
                url: url.clone(),
                status: response.status,
            });
        }
        let payload: ForecastPayload =
            serde_json::from_value(response.body).map_err(|source| UpstreamError::InvalidResponse {
                url: url.clone(),
                source,
            })?;
        Ok(payload.current_weather)
    }
}
