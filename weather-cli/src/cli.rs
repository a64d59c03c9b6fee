use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use wxlookup_core::{Config, Event, SearchQuery, Session, WeatherProvider, provider_from_config};

use crate::{
    interactive,
    render::{Layout, TerminalPresenter},
    voice::CommandRecognizer,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wxlookup", version, about = "Search current weather by city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default city.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name.
        city: String,

        /// Print the raw API payload as JSON instead of the summary.
        #[arg(long)]
        json: bool,
    },

    /// Search box on stdin: type cities, `:voice` for voice search.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, json } => show(&city, json).await,
            Command::Interactive => interactive_session().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let city = inquire::Text::new("Default city:")
        .with_default(&cfg.default_city)
        .prompt()
        .context("Failed to read default city")?;

    let city = SearchQuery::parse(&city).context("Default city must be a city name")?;

    cfg.set_api_key(api_key.trim().to_string());
    cfg.default_city = city.to_string();
    cfg.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Without a key the session still runs; every search then alerts.
fn provider_or_none(cfg: &Config) -> Option<std::sync::Arc<dyn WeatherProvider>> {
    match provider_from_config(cfg) {
        Ok(provider) => Some(provider),
        Err(e) => {
            tracing::debug!(error = %e, "no weather provider");
            None
        }
    }
}

async fn show(city: &str, json: bool) -> anyhow::Result<()> {
    let cfg = Config::resolve()?;

    let layout = if json { Layout::AlertsOnly } else { Layout::Summary };
    let presenter = TerminalPresenter::new(io::stdout(), layout);
    let mut session = Session::new(&cfg, provider_or_none(&cfg), None, presenter)?;

    session.dispatch(Event::QueryChanged(city.to_string()));
    session.dispatch(Event::SubmitClicked);
    session.settle().await;

    let Some(result) = session.state().result.clone() else {
        bail!("No weather data for '{}'", city.trim());
    };

    let mut out = session.into_presenter().into_inner();
    if json {
        let text = serde_json::to_string_pretty(result.payload())
            .context("Failed to serialize weather payload")?;
        writeln!(out, "{text}")?;
    }
    out.flush()?;

    Ok(())
}

async fn interactive_session() -> anyhow::Result<()> {
    let cfg = Config::resolve()?;

    let recognizer =
        CommandRecognizer::factory(cfg.voice.command.clone(), cfg.voice.listen_timeout());
    let presenter = TerminalPresenter::new(io::stdout(), Layout::Interactive);
    let mut session = Session::new(&cfg, provider_or_none(&cfg), recognizer, presenter)?;

    interactive::run(&mut session, &mut io::stdout()).await
}
