//! Error types for report generation and configuration.

use thiserror::Error;

/// Failure while producing the report for a single location.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Request URLs carry credentials, so the error is stored without one.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Provider answered, but not with `status: ok` or a 2xx code.
    #[error("provider status: {0}")]
    Status(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("malformed payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ReportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.without_url())
    }
}

impl ReportError {
    pub fn missing<S: Into<String>>(field: S) -> Self {
        Self::MissingField(field.into())
    }

    /// Text sent to recipients in place of the report.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(e) => format!("🌐 Network error: {e}"),
            Self::Status(status) => format!("⚠️ Weather API status abnormal: {status}"),
            Self::MissingField(field) => format!("🔑 Missing data field: {field}"),
            Self::Parse(e) => format!("🔑 Missing data field: {e}"),
            Self::Other(msg) => format!("❌ Unexpected error: {msg}"),
        }
    }
}

/// Configuration problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse location list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no {0} configured")]
    MissingKey(&'static str),
}
