//! Quote-of-the-day and filler text sources.
//!
//! Both sources swallow every failure and return a fixed fallback instead.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::model::Quote;

pub const DEFAULT_QUOTE_URL: &str = "https://v1.hitokoto.cn/";
pub const QUOTE_FALLBACK: &str = "Every day is a good day.";
pub const FILLER_FALLBACK: &str = "Nothing to read today.";

const QUOTE_TIMEOUT: Duration = Duration::from_secs(3);
const FILLER_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait SnippetSource: Send + Sync {
    /// Never fails; errors degrade to the source's fallback text.
    async fn fetch(&self) -> String;
}

/// Known quote payload shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuotePayload {
    Hitokoto {
        hitokoto: String,
        #[serde(default)]
        from: Option<String>,
    },
    Content {
        content: String,
        #[serde(default)]
        author: Option<String>,
    },
}

impl From<QuotePayload> for Quote {
    fn from(payload: QuotePayload) -> Self {
        match payload {
            QuotePayload::Hitokoto { hitokoto, from } => Quote { text: hitokoto, author: from },
            QuotePayload::Content { content, author } => Quote { text: content, author },
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuoteSource {
    url: String,
    http: Client,
}

impl QuoteSource {
    pub fn new(url: &str) -> reqwest::Result<Self> {
        Ok(Self {
            url: url.to_string(),
            http: Client::builder().timeout(QUOTE_TIMEOUT).build()?,
        })
    }

    pub async fn fetch_quote(&self) -> anyhow::Result<Quote> {
        let payload: QuotePayload = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(payload.into())
    }
}

#[async_trait]
impl SnippetSource for QuoteSource {
    async fn fetch(&self) -> String {
        match self.fetch_quote().await {
            Ok(quote) => quote.to_string(),
            Err(e) => {
                warn!(url = %self.url, error = %e, "Quote fetch failed, using fallback");
                QUOTE_FALLBACK.to_string()
            }
        }
    }
}

/// Plain-text content endpoint.
#[derive(Debug, Clone)]
pub struct FillerSource {
    url: String,
    http: Client,
}

impl FillerSource {
    pub fn new(url: &str) -> reqwest::Result<Self> {
        Ok(Self {
            url: url.to_string(),
            http: Client::builder().timeout(FILLER_TIMEOUT).build()?,
        })
    }
}

#[async_trait]
impl SnippetSource for FillerSource {
    async fn fetch(&self) -> String {
        let res = match self.http.get(&self.url).send().await {
            Ok(res) => res,
            Err(e) => {
                warn!(url = %self.url, error = %e, "Filler fetch failed, using fallback");
                return FILLER_FALLBACK.to_string();
            }
        };

        if res.status() != reqwest::StatusCode::OK {
            warn!(url = %self.url, status = %res.status(), "Filler endpoint returned non-200");
            return FILLER_FALLBACK.to_string();
        }

        match res.text().await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => FILLER_FALLBACK.to_string(),
            Err(e) => {
                warn!(url = %self.url, error = %e, "Filler body unreadable, using fallback");
                FILLER_FALLBACK.to_string()
            }
        }
    }
}

/// A source that always yields the same text. Used when no endpoint is configured.
#[derive(Debug, Clone)]
pub struct StaticSnippet(pub String);

#[async_trait]
impl SnippetSource for StaticSnippet {
    async fn fetch(&self) -> String {
        self.0.clone()
    }
}
