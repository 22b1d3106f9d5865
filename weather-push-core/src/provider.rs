use crate::{Config, error::ReportError, model::{Forecast, Location}, provider::caiyun::CaiyunProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod caiyun;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, location: &Location) -> Result<Forecast, ReportError>;
}

/// Construct the weather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.caiyun_api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
        anyhow::anyhow!(
            "No Caiyun API key configured.\n\
             Hint: run `weather-push configure` or set CAIYUN_API_KEY."
        )
    })?;

    let provider = match config.weather_base_url.as_deref() {
        Some(base) => CaiyunProvider::with_base_url(api_key, base)?,
        None => CaiyunProvider::new(api_key)?,
    };

    Ok(Box::new(provider))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
