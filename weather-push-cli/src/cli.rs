use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, Text};
use tracing::{info, warn};
use weather_push_core::{Config, ConfigError, Location, Pipeline, RunSummary, config::split_keys};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-push", version, about = "Fetch weather reports and push them to your phone")]
pub struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build and push a report for every configured location.
    Run {
        /// Print reports to stdout instead of pushing them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Interactively set the API key, push keys and locations.
    Configure,

    /// List the locations a run would use.
    Locations,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Run { dry_run } => {
                let (config, location_error) = load_config(self.config.as_deref())?;
                run_push(&config, location_error, dry_run).await
            }
            Command::Configure => configure(self.config.as_deref()),
            Command::Locations => {
                let (config, location_error) = load_config(self.config.as_deref())?;
                if let Some(err) = location_error {
                    eprintln!("Warning: {err}");
                }
                for location in config.valid_locations() {
                    println!("{}\t{}", location.name, location.coords);
                }
                Ok(())
            }
        }
    }
}

/// Config file plus environment. A broken location list is handed back separately.
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<(Config, Option<ConfigError>)> {
    let mut config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let location_error = config.apply_env(|key| std::env::var(key).ok()).err();
    Ok((config, location_error))
}

async fn run_push(
    config: &Config,
    location_error: Option<ConfigError>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let locations = config.valid_locations();
    if locations.is_empty() && location_error.is_none() {
        print_no_locations_hint();
        return Ok(());
    }

    let pipeline = Pipeline::from_config(config, dry_run)?;
    push_reports(&pipeline, &locations, location_error.as_ref()).await;
    Ok(())
}

/// Sends the location diagnostic, if any, then one report per location.
async fn push_reports(
    pipeline: &Pipeline,
    locations: &[Location],
    location_error: Option<&ConfigError>,
) -> Option<RunSummary> {
    if let Some(err) = location_error {
        warn!(error = %err, "Location configuration is invalid");
        pipeline.report_config_error(err).await;
    }

    if locations.is_empty() {
        print_no_locations_hint();
        return None;
    }

    let summary = pipeline.run(locations, Utc::now()).await;
    info!(
        locations = summary.outcomes.len(),
        failed = summary.failed_locations(),
        "Run finished"
    );
    Some(summary)
}

fn print_no_locations_hint() {
    eprintln!(
        "No valid locations configured.\n\
         Hint: run `weather-push configure` or set WEATHER_LOCATIONS to a JSON list of {{\"name\", \"coords\"}}."
    );
}

fn configure(path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let mut config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let api_key = Password::new("Caiyun API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.caiyun_api_key = Some(api_key.trim().to_string());
    }

    let push_keys = Text::new("PushDeer keys (comma-separated):")
        .with_default(&config.push_keys.join(","))
        .prompt()
        .context("Failed to read push keys")?;
    config.push_keys = split_keys(&push_keys);

    while Confirm::new("Add or update a location?")
        .with_default(config.locations.is_empty())
        .prompt()
        .context("Failed to read answer")?
    {
        let name = Text::new("Location name:").prompt().context("Failed to read name")?;
        let coords = Text::new("Coordinates (longitude,latitude):")
            .prompt()
            .context("Failed to read coordinates")?;
        config.upsert_location(Location {
            name: name.trim().to_string(),
            coords: coords.trim().to_string(),
        });
    }

    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    println!("Configuration saved ({} location(s)).", config.valid_locations().len());

    Ok(())
}
