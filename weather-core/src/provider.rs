use crate::{
    Config, FetchError, Suggestion, WeatherResult, config::API_KEY_ENV,
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Looks up place candidates for a partially typed city name.
#[async_trait]
pub trait SuggestionFetcher: Send + Sync + Debug {
    async fn fetch_suggestions(&self, query: &str) -> Result<Vec<Suggestion>, FetchError>;
}

/// Looks up current conditions for a resolved place query.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch_weather(&self, query: &str) -> Result<WeatherResult, FetchError>;
}

/// Construct the OpenWeather client from config and an optional explicit key.
///
/// An explicit key (CLI flag or environment) wins over the one stored on disk.
pub fn client_from_config(
    config: &Config,
    api_key: Option<String>,
) -> anyhow::Result<OpenWeatherClient> {
    let api_key = api_key
        .filter(|key| !key.trim().is_empty())
        .or_else(|| config.api_key.clone().filter(|key| !key.is_empty()))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weather configure` or set {API_KEY_ENV}."
            )
        })?;

    let client = match config.base_url.as_deref() {
        Some(base_url) => OpenWeatherClient::with_base_url(api_key, base_url),
        None => OpenWeatherClient::new(api_key),
    };

    Ok(client)
}
