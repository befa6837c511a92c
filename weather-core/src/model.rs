use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of place candidates kept from a suggestion lookup.
pub const SUGGESTION_LIMIT: usize = 5;

/// A candidate place returned by the geocoding lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub country: String,
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Suggestion {
    /// Query string used once this place is selected, e.g. `"Paris, FR"`.
    pub fn query(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

impl std::fmt::Display for Suggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            Some(state) => write!(f, "{}, {} ({})", self.name, self.country, state),
            None => write!(f, "{}, {}", self.name, self.country),
        }
    }
}

/// Current conditions for one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub location_name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub observed_at: DateTime<Utc>,
}

/// Lifecycle of the weather lookup as seen by a renderer.
///
/// `Loading` keeps the previously shown result only so a failed fetch can put
/// it back; it is never displayed while the fetch is outstanding.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WeatherState {
    #[default]
    Idle,
    Loading {
        previous: Option<WeatherResult>,
    },
    Success(WeatherResult),
    Failed {
        message: String,
        stale: Option<WeatherResult>,
    },
}

impl WeatherState {
    pub fn is_loading(&self) -> bool {
        matches!(self, WeatherState::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            WeatherState::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Result a renderer should show, if any.
    pub fn weather(&self) -> Option<&WeatherResult> {
        match self {
            WeatherState::Success(result) => Some(result),
            WeatherState::Failed { stale, .. } => stale.as_ref(),
            WeatherState::Idle | WeatherState::Loading { .. } => None,
        }
    }

    /// Last known result, including one hidden behind an outstanding fetch.
    pub(crate) fn last_result(&self) -> Option<WeatherResult> {
        match self {
            WeatherState::Loading { previous } => previous.clone(),
            other => other.weather().cloned(),
        }
    }
}

/// Owned copy of the coordinator state handed to renderers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchView {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
    pub weather: WeatherState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WeatherResult {
        WeatherResult {
            location_name: "London".into(),
            temperature_c: 11.5,
            feels_like_c: 10.2,
            condition: "light rain".into(),
            humidity_pct: 81,
            wind_speed_mps: 4.1,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn suggestion_query_joins_name_and_country() {
        let s = Suggestion {
            name: "Paris".into(),
            country: "FR".into(),
            state: Some("Ile-de-France".into()),
            lat: 48.85,
            lon: 2.35,
        };
        assert_eq!(s.query(), "Paris, FR");
        assert_eq!(s.to_string(), "Paris, FR (Ile-de-France)");
    }

    #[test]
    fn loading_hides_previous_result() {
        let result = sample();
        let state = WeatherState::Loading { previous: Some(result.clone()) };
        assert!(state.is_loading());
        assert!(state.weather().is_none());
        assert!(state.error().is_none());
        assert_eq!(state.last_result(), Some(result));
    }

    #[test]
    fn failed_shows_stale_result_and_message() {
        let result = sample();
        let state = WeatherState::Failed { message: "boom".into(), stale: Some(result.clone()) };
        assert_eq!(state.error(), Some("boom"));
        assert_eq!(state.weather(), Some(&result));
        assert!(!state.is_loading());
    }
}
