//! Core library for the `weather-push` CLI.
//!
//! This crate defines:
//! - Configuration (TOML file plus environment overrides)
//! - The weather provider abstraction and the Caiyun implementation
//! - Report building: skycon labels, wind/humidity levels, hourly rain alerts
//! - Snippet sources and push delivery
//!
//! It is used by `weather-push-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod hourly;
pub mod metrics;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod skycon;
pub mod snippet;

pub use config::Config;
pub use error::{ConfigError, ReportError};
pub use model::{AlertRange, Forecast, HourlySample, Location};
pub use notify::{DispatchReport, Notifier};
pub use pipeline::{Pipeline, RunSummary};
pub use provider::WeatherProvider;
pub use report::ReportBuilder;
pub use skycon::{SkyconTable, Translate};
