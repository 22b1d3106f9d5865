use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// A named place to report on. `coords` is the provider's "lon,lat" string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub coords: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirQuality {
    pub aqi: f64,
    pub description: String,
}

/// Realtime reading at the location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSnapshot {
    pub skycon: String,
    pub temperature: f64,
    pub apparent_temperature: f64,
    /// m/s
    pub wind_speed: f64,
    /// Fraction in 0..=1.
    pub humidity: f64,
    /// mm/h
    pub precipitation_intensity: f64,
    pub air_quality: Option<AirQuality>,
}

/// One day of the multi-day forecast. Index in the sequence is the day offset from today.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyForecastEntry {
    /// Raw provider date, e.g. `2024-06-01T00:00+08:00`.
    pub date: String,
    pub skycon: String,
    pub min_temperature: f64,
    pub max_temperature: f64,
    /// 0..=100
    pub precipitation_probability: f64,
    /// Fraction in 0..=1.
    pub humidity: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlySample {
    pub timestamp: DateTime<FixedOffset>,
    /// 0..=100
    pub probability: f64,
    pub skycon: String,
}

/// A contiguous window of hours where rain is likely.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Skycon code of the hour with the highest probability in the range.
    pub skycon: String,
    pub max_probability: f64,
}

/// A warning published by the provider's alert block.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub title: String,
    pub description: String,
    /// `None` when the provider did not say; such warnings are treated as active.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AlertEvent {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expiry| expiry > now)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifeIndexEntry {
    pub date: String,
    pub ultraviolet: String,
    pub dressing: String,
    pub comfort: String,
}

/// Everything the provider returned for one location, normalised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    pub realtime: WeatherSnapshot,
    pub daily: Vec<DailyForecastEntry>,
    pub hourly: Vec<HourlySample>,
    pub alerts: Vec<AlertEvent>,
    pub life_index: Vec<LifeIndexEntry>,
    pub keypoint: Option<String>,
}

/// Quote-of-the-day as returned by the quote collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    pub author: Option<String>,
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.author {
            Some(author) if !author.is_empty() => write!(f, "{} —— {}", self.text, author),
            _ => f.write_str(&self.text),
        }
    }
}

/// The two freeform text snippets appended to every report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snippets {
    pub quote: String,
    pub filler: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn alert_without_expiry_is_active() {
        let alert = AlertEvent {
            title: "t".into(),
            description: "d".into(),
            expires_at: None,
        };
        assert!(alert.is_active(Utc::now()));
    }

    #[test]
    fn expired_alert_is_inactive() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let alert = AlertEvent {
            title: "t".into(),
            description: "d".into(),
            expires_at: Some(now - chrono::Duration::minutes(1)),
        };
        assert!(!alert.is_active(now));

        let alert = AlertEvent { expires_at: Some(now + chrono::Duration::minutes(1)), ..alert };
        assert!(alert.is_active(now));
    }

    #[test]
    fn quote_display_includes_author_when_known() {
        let quote = Quote { text: "hello".into(), author: Some("me".into()) };
        assert_eq!(quote.to_string(), "hello —— me");

        let quote = Quote { text: "hello".into(), author: None };
        assert_eq!(quote.to_string(), "hello");
    }
}
