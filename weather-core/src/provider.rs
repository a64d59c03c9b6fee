use crate::{
    Config, SearchQuery, WeatherResult, error::LookupError,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Look up current conditions for `city`.
    ///
    /// `Ok` only when the embedded status code says success; an API-level
    /// rejection is [`LookupError::Api`], anything that kept a usable body
    /// from arriving is [`LookupError::Unavailable`].
    async fn current_weather(&self, city: &SearchQuery) -> Result<WeatherResult, LookupError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
             Hint: set OPENWEATHER_API_KEY or run `wxlookup configure` and enter your API key."
        )
    })?;

    let provider = OpenWeatherProvider::new(
        api_key.to_owned(),
        config.base_url.clone(),
        config.request_timeout(),
    )?;

    Ok(Arc::new(provider))
}
