use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::{
    error::{DEFAULT_NOT_FOUND_MESSAGE, LookupError},
    model::{SearchQuery, WeatherResult},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/weather", self.base_url)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, city: &SearchQuery) -> Result<WeatherResult, LookupError> {
        // HTTP status is ignored; OpenWeather reports its verdict in `cod`.
        let res = self
            .http
            .get(self.endpoint())
            .query(&[
                ("q", city.as_str()),
                ("units", "metric"),
                ("APPID", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| unavailable("Failed to send request to OpenWeather", e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| unavailable("Failed to read OpenWeather response body", e))?;

        let payload: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(%status, body = %truncate_body(&body), "undecodable OpenWeather body");
            unavailable("Failed to parse OpenWeather JSON", e)
        })?;

        let result = WeatherResult::from_payload(payload);
        if result.is_success() {
            tracing::debug!(city = %city, condition = ?result.condition(), "weather received");
            return Ok(result);
        }

        let message = result.message().unwrap_or(DEFAULT_NOT_FOUND_MESSAGE).to_string();
        let code = result.status_code();
        tracing::info!(city = %city, ?code, %message, "OpenWeather rejected lookup");

        Err(LookupError::Api { code, message })
    }
}

fn unavailable(what: &str, err: impl std::fmt::Display) -> LookupError {
    tracing::warn!(error = %err, "{what}");
    LookupError::Unavailable(format!("{what}: {err}"))
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
