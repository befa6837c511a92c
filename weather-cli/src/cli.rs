use std::{fmt, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use tracing::debug;
use weather_core::{
    Config, SearchCoordinator, Suggestion, config::API_KEY_ENV, provider::client_from_config,
};

use crate::render::{render, render_suggestions};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// OpenWeather API key; overrides the configured one.
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Log lookups to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure {
        /// Alternative API host, e.g. a local proxy.
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Show current weather for a city.
    Show {
        /// City name, optionally followed by a country code ("Paris, FR").
        city: String,
    },

    /// Search interactively with city suggestions.
    Search,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { base_url } => configure(base_url).await,
            Command::Show { city } => {
                let coordinator = coordinator(self.api_key)?;
                show(&coordinator, city).await;
                Ok(())
            }
            Command::Search => {
                let coordinator = coordinator(self.api_key)?;
                search(&coordinator).await
            }
        }
    }
}

fn coordinator(api_key: Option<String>) -> anyhow::Result<SearchCoordinator> {
    let config = Config::load()?;
    let client = Arc::new(client_from_config(&config, api_key)?);
    debug!(base_url = client.base_url(), "using OpenWeather client");

    Ok(SearchCoordinator::new(client.clone(), client))
}

async fn configure(base_url: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if config.is_configured() {
        println!("An API key is already stored; entering a new one replaces it.");
    }

    let api_key = prompt(|| {
        Password::new("OpenWeather API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt_skippable()
    })
    .await?;
    let Some(api_key) = api_key else {
        println!("Configuration cancelled.");
        return Ok(());
    };

    if api_key.trim().is_empty() {
        anyhow::bail!("API key cannot be empty.");
    }

    config.set_api_key(api_key);
    if base_url.is_some() {
        config.base_url = base_url;
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn show(coordinator: &SearchCoordinator, city: String) {
    coordinator.on_query_change(city).await;
    let suggestions = coordinator.suggestions();

    coordinator.on_submit().await;
    let view = coordinator.snapshot();

    print!("{}", render(&view));
    if view.weather.error().is_some() {
        print!("{}", render_suggestions(&suggestions));
    }
}

/// Entry in the suggestion picker.
enum Choice {
    Place(Suggestion),
    AsTyped(String),
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Place(suggestion) => fmt::Display::fmt(suggestion, f),
            Choice::AsTyped(query) => write!(f, "Search \"{}\" as typed", query.trim()),
        }
    }
}

async fn search(coordinator: &SearchCoordinator) -> anyhow::Result<()> {
    loop {
        let text = prompt(|| Text::new("City:").with_help_message("Esc to quit").prompt_skippable())
            .await?;
        let Some(text) = text else {
            return Ok(());
        };

        coordinator.on_query_change(text).await;
        let suggestions = coordinator.suggestions();

        if suggestions.is_empty() {
            coordinator.on_submit().await;
        } else {
            let mut choices: Vec<Choice> = suggestions.into_iter().map(Choice::Place).collect();
            choices.push(Choice::AsTyped(coordinator.query()));

            let picked =
                prompt(move || Select::new("Did you mean:", choices).prompt_skippable()).await?;
            match picked {
                Some(Choice::Place(suggestion)) => {
                    coordinator.on_suggestion_select(&suggestion).await
                }
                Some(Choice::AsTyped(_)) => coordinator.on_submit().await,
                None => continue,
            }
        }

        println!("{}", render(&coordinator.snapshot()));
    }
}

/// Runs a terminal prompt on the blocking pool so runtime tasks keep going.
async fn prompt<T, F>(ask: F) -> anyhow::Result<Option<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<Option<T>, InquireError> + Send + 'static,
{
    let answer = tokio::task::spawn_blocking(ask).await.context("Prompt task failed")?;
    interrupted_as_none(answer)
}

/// Treats Ctrl-C like Esc so the loop exits cleanly.
fn interrupted_as_none<T>(answer: Result<Option<T>, InquireError>) -> anyhow::Result<Option<T>> {
    match answer {
        Ok(answer) => Ok(answer),
        Err(InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).context("Failed to read input"),
    }
}
