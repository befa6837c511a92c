//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The suggestion and weather fetcher contracts, with an OpenWeather client
//! - `SearchCoordinator`, which turns user input into a consistent search state
//! - Shared domain models (suggestions, weather results, search state)
//!
//! It is used by `weather-cli`, but any other front end can drive the
//! coordinator and render its [`SearchView`].

pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod provider;

pub use config::Config;
pub use coordinator::SearchCoordinator;
pub use error::FetchError;
pub use model::{SearchView, Suggestion, WeatherResult, WeatherState};
pub use provider::{SuggestionFetcher, WeatherFetcher, openweather::OpenWeatherClient};
