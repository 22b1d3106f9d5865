//! Per-location fetch, build and dispatch.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::{
    Config,
    error::ConfigError,
    model::{Location, Snippets},
    notify::{DispatchReport, Notifier, PushDeerNotifier, StdoutNotifier},
    provider::{WeatherProvider, provider_from_config},
    report::ReportBuilder,
    skycon::{SkyconTable, Translate},
    snippet::{DEFAULT_QUOTE_URL, FILLER_FALLBACK, FillerSource, QuoteSource, SnippetSource, StaticSnippet},
};

/// What happened for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationOutcome {
    pub location: String,
    /// The report, or the error text sent in its place.
    pub message: String,
    pub succeeded: bool,
    pub dispatch: DispatchReport,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub outcomes: Vec<LocationOutcome>,
}

impl RunSummary {
    pub fn failed_locations(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded).count()
    }
}

pub struct Pipeline<T = SkyconTable> {
    provider: Box<dyn WeatherProvider>,
    quote: Box<dyn SnippetSource>,
    filler: Box<dyn SnippetSource>,
    notifier: Box<dyn Notifier>,
    builder: ReportBuilder<T>,
}

impl Pipeline {
    /// Wire the real collaborators from config. `dry_run` prints instead of pushing.
    pub fn from_config(config: &Config, dry_run: bool) -> anyhow::Result<Self> {
        let provider = provider_from_config(config)?;

        let quote = QuoteSource::new(config.quote_url.as_deref().unwrap_or(DEFAULT_QUOTE_URL))?;

        let filler: Box<dyn SnippetSource> = match config.filler_url.as_deref() {
            Some(url) => Box::new(FillerSource::new(url)?),
            None => Box::new(StaticSnippet(FILLER_FALLBACK.to_string())),
        };

        let notifier: Box<dyn Notifier> = if dry_run {
            Box::new(StdoutNotifier)
        } else {
            let keys = config.require_push_keys()?.to_vec();
            match config.push_base_url.as_deref() {
                Some(base) => Box::new(PushDeerNotifier::with_base_url(keys, base)?),
                None => Box::new(PushDeerNotifier::new(keys)?),
            }
        };

        Ok(Self::new(provider, Box::new(quote), filler, notifier, ReportBuilder::default()))
    }
}

impl<T: Translate> Pipeline<T> {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        quote: Box<dyn SnippetSource>,
        filler: Box<dyn SnippetSource>,
        notifier: Box<dyn Notifier>,
        builder: ReportBuilder<T>,
    ) -> Self {
        Self { provider, quote, filler, notifier, builder }
    }

    /// Report text for one location; failures are turned into their user message.
    #[instrument(skip(self, now), fields(location = %location.name))]
    pub async fn report_for(&self, location: &Location, now: DateTime<Utc>) -> Result<String, String> {
        match self.provider.fetch(location).await {
            Ok(forecast) => {
                let snippets = Snippets {
                    quote: self.quote.fetch().await,
                    filler: self.filler.fetch().await,
                };
                Ok(self.builder.build(location, &forecast, &snippets, now))
            }
            Err(e) => {
                warn!(error = %e, "Report generation failed");
                Err(format!("{} [{}]", e.user_message(), location.name))
            }
        }
    }

    /// Process locations one after another. A failing location never stops the rest.
    pub async fn run(&self, locations: &[Location], now: DateTime<Utc>) -> RunSummary {
        let mut summary = RunSummary::default();

        for location in locations {
            let (message, succeeded) = match self.report_for(location, now).await {
                Ok(report) => (report, true),
                Err(text) => (text, false),
            };

            let dispatch = self.notifier.send(&message).await;
            info!(
                location = %location.name,
                succeeded,
                delivered = dispatch.delivered.len(),
                failed = dispatch.failed.len(),
                "Location processed"
            );

            summary.outcomes.push(LocationOutcome {
                location: location.name.clone(),
                message,
                succeeded,
                dispatch,
            });
        }

        summary
    }

    /// Send a one-off diagnostic about broken configuration.
    pub async fn report_config_error(&self, err: &ConfigError) -> DispatchReport {
        self.notifier.send(&format!("⚙️ Configuration error: {err}")).await
    }
}
