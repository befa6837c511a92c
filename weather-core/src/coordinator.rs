//! Reconciles user input with the two asynchronous lookups.
//!
//! Every fetch takes a sequence token when it starts. A response is applied
//! only while its token is still the latest one, so the most recently
//! *started* request wins no matter in which order responses arrive.
//!
//! State lives behind a mutex that is never held across an `.await`; user
//! events and fetch completions are applied one at a time.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::{
    model::{SUGGESTION_LIMIT, SearchView, Suggestion, WeatherResult, WeatherState},
    provider::{SuggestionFetcher, WeatherFetcher},
};

pub const EMPTY_QUERY_MESSAGE: &str = "City name cannot be empty.";
pub const FETCH_FAILED_MESSAGE: &str = "Unable to fetch weather data. Please check the city name.";

#[derive(Debug, Default)]
struct SearchState {
    query: String,
    suggestions: Vec<Suggestion>,
    weather: WeatherState,
    suggestion_seq: u64,
    weather_seq: u64,
}

impl SearchState {
    /// Clears the list and invalidates any suggestion lookup still in flight.
    fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.suggestion_seq += 1;
    }

    fn fail(&mut self, message: &str) {
        let stale = self.weather.last_result();
        self.weather = WeatherState::Failed { message: message.to_string(), stale };
    }
}

/// Owns the search state and sequences suggestion and weather lookups.
///
/// Cloning is cheap and every clone shares the same state, which is how a
/// suggestion lookup can run in the background while input keeps coming.
#[derive(Debug, Clone)]
pub struct SearchCoordinator {
    suggestion_fetcher: Arc<dyn SuggestionFetcher>,
    weather_fetcher: Arc<dyn WeatherFetcher>,
    state: Arc<Mutex<SearchState>>,
}

impl SearchCoordinator {
    /// Creates an idle coordinator. Nothing is fetched until the first input.
    pub fn new(
        suggestion_fetcher: Arc<dyn SuggestionFetcher>,
        weather_fetcher: Arc<dyn WeatherFetcher>,
    ) -> Self {
        Self {
            suggestion_fetcher,
            weather_fetcher,
            state: Arc::new(Mutex::new(SearchState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn query(&self) -> String {
        self.lock().query.clone()
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.lock().suggestions.clone()
    }

    pub fn weather_state(&self) -> WeatherState {
        self.lock().weather.clone()
    }

    pub fn snapshot(&self) -> SearchView {
        let state = self.lock();
        SearchView {
            query: state.query.clone(),
            suggestions: state.suggestions.clone(),
            weather: state.weather.clone(),
        }
    }

    /// Records the new query text and refreshes suggestions for it.
    ///
    /// Blank text clears the list without a lookup. Lookup failures only get
    /// logged and leave the list empty.
    pub async fn on_query_change(&self, text: impl Into<String>) {
        let text = text.into();

        let token = {
            let mut state = self.lock();
            state.query = text.clone();

            if text.trim().is_empty() {
                state.clear_suggestions();
                return;
            }

            state.suggestion_seq += 1;
            state.suggestion_seq
        };

        let outcome = self.suggestion_fetcher.fetch_suggestions(&text).await;

        let mut state = self.lock();
        if state.suggestion_seq != token {
            debug!(query = %text, token, "discarding superseded suggestions");
            return;
        }

        match outcome {
            Ok(mut suggestions) => {
                suggestions.truncate(SUGGESTION_LIMIT);
                debug!(query = %text, count = suggestions.len(), "suggestions updated");
                state.suggestions = suggestions;
            }
            Err(err) => {
                warn!(query = %text, error = %err, "error fetching city suggestions");
                state.suggestions.clear();
            }
        }
    }

    /// Runs [`Self::on_query_change`] in the background.
    pub fn spawn_query_change(&self, text: impl Into<String>) -> JoinHandle<()> {
        let this = self.clone();
        let text = text.into();
        tokio::spawn(async move { this.on_query_change(text).await })
    }

    /// Adopts a suggestion as the query and looks up its weather.
    pub async fn on_suggestion_select(&self, suggestion: &Suggestion) {
        let query = suggestion.query();
        {
            let mut state = self.lock();
            state.query = query.clone();
            state.clear_suggestions();
        }

        self.submit_search(query).await;
    }

    /// Looks up weather for the current query, rejecting blank input locally.
    pub async fn on_submit(&self) {
        let query = {
            let mut state = self.lock();
            if state.query.trim().is_empty() {
                // Starts no request, so a lookup still in flight may land later.
                state.fail(EMPTY_QUERY_MESSAGE);
                return;
            }

            state.clear_suggestions();
            state.query.clone()
        };

        self.submit_search(query).await;
    }

    #[instrument(skip(self))]
    async fn submit_search(&self, query: String) {
        let token = {
            let mut state = self.lock();
            state.weather_seq += 1;
            let previous = state.weather.last_result();
            state.weather = WeatherState::Loading { previous };
            state.weather_seq
        };

        info!(token, "fetching current weather");
        let outcome = self.weather_fetcher.fetch_weather(&query).await;

        let mut state = self.lock();
        if state.weather_seq != token {
            debug!(token, latest = state.weather_seq, "discarding superseded weather result");
            return;
        }

        match outcome {
            Ok(result) => {
                info!(location = %result.location_name, "weather updated");
                state.weather = WeatherState::Success(result);
            }
            Err(err) => {
                warn!(error = %err, "weather fetch failed");
                state.fail(FETCH_FAILED_MESSAGE);
            }
        }
    }

    /// Result currently shown to the user, if any.
    pub fn weather(&self) -> Option<WeatherResult> {
        self.lock().weather.weather().cloned()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().weather.error().map(str::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.lock().weather.is_loading()
    }
}
