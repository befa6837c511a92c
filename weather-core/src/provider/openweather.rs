use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    error::FetchError,
    model::{SUGGESTION_LIMIT, Suggestion, WeatherResult},
};

use super::{SuggestionFetcher, WeatherFetcher};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const GEOCODING: &str = "OpenWeather geocoding";
const CURRENT: &str = "OpenWeather current weather";

/// Client for the OpenWeather geocoding and current-weather endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| FetchError::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(FetchError::Status { endpoint, status, body: truncate_body(&body) });
        }

        Ok(body)
    }
}

#[async_trait]
impl SuggestionFetcher for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn fetch_suggestions(&self, query: &str) -> Result<Vec<Suggestion>, FetchError> {
        let limit = SUGGESTION_LIMIT.to_string();
        let body = self
            .get(GEOCODING, "/geo/1.0/direct", &[("q", query), ("limit", limit.as_str())])
            .await?;

        let suggestions = parse_suggestions(&body)?;
        debug!(count = suggestions.len(), "received city suggestions");
        Ok(suggestions)
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn fetch_weather(&self, query: &str) -> Result<WeatherResult, FetchError> {
        let body =
            self.get(CURRENT, "/data/2.5/weather", &[("q", query), ("units", "metric")]).await?;

        let result = parse_weather(&body)?;
        debug!(location = %result.location_name, "received current weather");
        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoPlace {
    name: String,
    #[serde(default)]
    country: String,
    state: Option<String>,
    lat: f64,
    lon: f64,
}

impl From<OwGeoPlace> for Suggestion {
    fn from(place: OwGeoPlace) -> Self {
        Suggestion {
            name: place.name,
            country: place.country,
            state: place.state,
            lat: place.lat,
            lon: place.lon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl From<OwCurrentResponse> for WeatherResult {
    fn from(parsed: OwCurrentResponse) -> Self {
        let condition = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .unwrap_or_else(|| "Unknown".to_string());

        WeatherResult {
            location_name: parsed.name,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            condition,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            observed_at: unix_to_utc(parsed.dt).unwrap_or_else(Utc::now),
        }
    }
}

fn parse_suggestions(body: &str) -> Result<Vec<Suggestion>, FetchError> {
    let places: Vec<OwGeoPlace> = serde_json::from_str(body)
        .map_err(|source| FetchError::Decode { endpoint: GEOCODING, source })?;

    Ok(places.into_iter().take(SUGGESTION_LIMIT).map(Suggestion::from).collect())
}

fn parse_weather(body: &str) -> Result<WeatherResult, FetchError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|source| FetchError::Decode { endpoint: CURRENT, source })?;

    Ok(parsed.into())
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
