//! Push delivery of finished reports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

pub const PUSHDEER_API_BASE: &str = "https://api2.pushdeer.com";

/// Longest message, in characters, the push service is sent.
pub const MAX_MESSAGE_CHARS: usize = 500;

const TIMEOUT: Duration = Duration::from_secs(15);

/// Outcome of delivering one message to every recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: Vec<String>,
    /// `(recipient, error)` pairs.
    pub failed: Vec<(String, String)>,
}

impl DispatchReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// One attempt per recipient; individual failures are recorded, never returned.
    async fn send(&self, message: &str) -> DispatchReport;
}

#[derive(Debug, Clone)]
pub struct PushDeerNotifier {
    keys: Vec<String>,
    base_url: String,
    http: Client,
}

impl PushDeerNotifier {
    pub fn new(keys: Vec<String>) -> reqwest::Result<Self> {
        Self::with_base_url(keys, PUSHDEER_API_BASE)
    }

    pub fn with_base_url(keys: Vec<String>, base_url: &str) -> reqwest::Result<Self> {
        Ok(Self {
            keys,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::builder().timeout(TIMEOUT).build()?,
        })
    }

    async fn push_one(&self, key: &str, text: &str) -> reqwest::Result<()> {
        self.http
            .get(format!("{}/message/push", self.base_url))
            .query(&[("pushkey", key), ("text", text)])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for PushDeerNotifier {
    async fn send(&self, message: &str) -> DispatchReport {
        let text = truncate_chars(message, MAX_MESSAGE_CHARS);
        let mut report = DispatchReport::default();

        for key in &self.keys {
            match self.push_one(key, text).await {
                Ok(()) => {
                    info!(recipient = %mask_key(key), "Message pushed");
                    report.delivered.push(key.clone());
                }
                Err(e) => {
                    // The request URL holds the push key.
                    let e = e.without_url();
                    warn!(recipient = %mask_key(key), error = %e, "Push failed");
                    report.failed.push((key.clone(), e.to_string()));
                }
            }
        }

        report
    }
}

/// Prints messages instead of pushing them.
#[derive(Debug, Clone, Default)]
pub struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn send(&self, message: &str) -> DispatchReport {
        println!("{message}\n");
        DispatchReport { delivered: vec!["stdout".to_string()], failed: Vec::new() }
    }
}

/// Cut `s` to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn mask_key(key: &str) -> String {
    let shown: String = key.chars().take(4).collect();
    format!("{shown}***")
}
