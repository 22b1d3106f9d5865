//! Skycon (weather condition code) to display label translation.

use std::{borrow::Cow, collections::HashMap};

/// Anything that can turn a condition code into a label.
pub trait Translate {
    fn translate(&self, code: &str) -> Cow<'_, str>;
}

const BUILTIN: &[(&str, &str)] = &[
    ("CLEAR_DAY", "☀️ Clear"),
    ("CLEAR_NIGHT", "🌙 Clear night"),
    ("PARTLY_CLOUDY_DAY", "⛅ Partly cloudy"),
    ("PARTLY_CLOUDY_NIGHT", "☁️ Partly cloudy night"),
    ("CLOUDY", "☁️ Cloudy"),
    ("LIGHT_RAIN", "🌦️ Light rain"),
    ("MODERATE_RAIN", "🌧️ Moderate rain"),
    ("HEAVY_RAIN", "💦 Heavy rain"),
    ("STORM_RAIN", "⛈️ Rainstorm"),
    ("LIGHT_SNOW", "❄️ Light snow"),
    ("MODERATE_SNOW", "🌨️ Moderate snow"),
    ("HEAVY_SNOW", "❄️ Heavy snow"),
    ("STORM_SNOW", "❄️ Snowstorm"),
    ("FOG", "🌫️ Fog"),
    ("LIGHT_HAZE", "😷 Light haze"),
    ("MODERATE_HAZE", "😷 Moderate haze"),
    ("HEAVY_HAZE", "😷 Heavy haze"),
    ("WIND", "🌪️ Strong wind"),
    ("DUST", "💨 Dust"),
    ("SAND", "💨 Sandstorm"),
];

/// Lookup table of known codes. Unknown codes come back as `❔<code>`.
#[derive(Debug, Clone)]
pub struct SkyconTable {
    labels: HashMap<String, String>,
}

impl SkyconTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            labels: entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for SkyconTable {
    fn default() -> Self {
        Self::new(BUILTIN.iter().copied())
    }
}

impl Translate for SkyconTable {
    fn translate(&self, code: &str) -> Cow<'_, str> {
        match self.labels.get(code) {
            Some(label) => Cow::Borrowed(label.as_str()),
            None => Cow::Owned(format!("❔{code}")),
        }
    }
}
