//! Formatting of the per-location text report.

use std::fmt::Write;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::{
    hourly::merge_precipitation_windows,
    metrics::{HumidityLevel, WindLevel},
    model::{AlertEvent, AlertRange, DailyForecastEntry, Forecast, Location, Snippets},
    skycon::{SkyconTable, Translate},
};

/// Offset suffix the provider appends to local timestamps.
const LOCAL_OFFSET_SUFFIX: &str = "+08:00";

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Days shown in the forecast block.
const FORECAST_DAYS: usize = 3;

/// Below this intensity (mm/h) the report says there is no precipitation.
const PRECIPITATION_NOTICEABLE: f64 = 0.1;

/// Builds the report text. Pure: identical inputs give identical output.
#[derive(Debug, Clone)]
pub struct ReportBuilder<T = SkyconTable> {
    skycons: T,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(SkyconTable::default())
    }
}

impl<T: Translate> ReportBuilder<T> {
    pub fn new(skycons: T) -> Self {
        Self { skycons }
    }

    pub fn build(
        &self,
        location: &Location,
        forecast: &Forecast,
        snippets: &Snippets,
        now: DateTime<Utc>,
    ) -> String {
        let mut out = format!("📍 {}\n\n", location.name);

        let active: Vec<&AlertEvent> =
            forecast.alerts.iter().filter(|alert| alert.is_active(now)).collect();
        if !active.is_empty() {
            self.write_warnings(&mut out, &active);
        }

        self.write_current(&mut out, forecast);
        self.write_upcoming(&mut out, forecast);
        self.write_daily(&mut out, &forecast.daily);
        if !forecast.life_index.is_empty() {
            self.write_life_index(&mut out, forecast);
        }

        let _ = writeln!(out, "💬 {}\n", snippets.quote);
        let _ = writeln!(out, "📖 {}", snippets.filler);

        out
    }

    fn write_warnings(&self, out: &mut String, alerts: &[&AlertEvent]) {
        out.push_str("🚨 Weather warnings\n\n");
        for alert in alerts {
            let _ = writeln!(out, "{} {}", warning_icon(&alert.title), alert.title);
            if !alert.description.is_empty() {
                let _ = writeln!(out, "{}", alert.description);
            }
            out.push('\n');
        }
    }

    fn write_current(&self, out: &mut String, forecast: &Forecast) {
        let now = &forecast.realtime;

        out.push_str("🌤️ Current conditions\n\n");
        if !now.skycon.is_empty() {
            let _ = writeln!(out, "{}", self.skycons.translate(&now.skycon));
        }
        let _ = writeln!(
            out,
            "Temperature: {}°C (feels like {}°C)",
            round(now.temperature),
            round(now.apparent_temperature)
        );
        let _ = writeln!(
            out,
            "Wind: {} 💨 Humidity: {} ({}%)",
            WindLevel::from_speed(now.wind_speed),
            HumidityLevel::from_fraction(now.humidity),
            round(now.humidity * 100.0)
        );

        if now.precipitation_intensity < PRECIPITATION_NOTICEABLE {
            out.push_str("Precipitation: no precipitation\n");
        } else {
            let _ = writeln!(out, "Precipitation: {:.1} mm/h 🌧️", now.precipitation_intensity);
        }

        if let Some(air) = &now.air_quality {
            let _ = writeln!(out, "Air quality: {} ({})", round(air.aqi), air.description);
        }
        out.push('\n');
    }

    fn write_upcoming(&self, out: &mut String, forecast: &Forecast) {
        out.push_str("⏰ Next 24 hours\n\n");
        if let Some(keypoint) = forecast.keypoint.as_deref().filter(|k| !k.is_empty()) {
            let _ = writeln!(out, "{keypoint}");
        }

        let ranges = merge_precipitation_windows(&forecast.hourly);
        if ranges.is_empty() {
            out.push_str("No rain expected\n");
        }
        for range in &ranges {
            let _ = writeln!(out, "{}", self.format_range(range));
        }
        out.push('\n');
    }

    fn format_range(&self, range: &AlertRange) -> String {
        // Ranges past midnight carry the day on both bounds.
        let fmt = if range.start.date_naive() == range.end.date_naive() {
            "%H:%M"
        } else {
            "%m-%d %H:%M"
        };
        format!(
            "{}–{} {} ({}%)",
            range.start.format(fmt),
            range.end.format(fmt),
            self.skycons.translate(&range.skycon),
            round(range.max_probability)
        )
    }

    fn write_daily(&self, out: &mut String, daily: &[DailyForecastEntry]) {
        out.push_str("📅 3-day forecast\n\n");
        for day in daily.iter().take(FORECAST_DAYS) {
            let _ = writeln!(
                out,
                "{} | {}",
                format_date(&day.date),
                self.skycons.translate(&day.skycon)
            );
            let _ = write!(
                out,
                "Temperature: {}~{}°C | Humidity: {} | Rain chance: {}%",
                round(day.min_temperature),
                round(day.max_temperature),
                HumidityLevel::from_fraction(day.humidity),
                round(day.precipitation_probability)
            );
            match day.description.as_deref().filter(|d| !d.is_empty()) {
                Some(description) => {
                    let _ = writeln!(out, " ({description})\n");
                }
                None => out.push_str("\n\n"),
            }
        }
    }

    fn write_life_index(&self, out: &mut String, forecast: &Forecast) {
        out.push_str("📊 Life index\n\n");
        for entry in forecast.life_index.iter().take(FORECAST_DAYS) {
            let _ = writeln!(
                out,
                "{} | UV: {} | Dressing: {} | Comfort: {}\n",
                format_date(&entry.date),
                entry.ultraviolet,
                entry.dressing,
                entry.comfort
            );
        }
    }
}

/// Icon for a warning, chosen by hazard keywords in its title.
pub fn warning_icon(title: &str) -> &'static str {
    let lower = title.to_lowercase();
    if title.contains("暴雨") || lower.contains("rainstorm") || lower.contains("storm rain") {
        "⛈️"
    } else if title.contains("寒潮") || lower.contains("cold wave") {
        "🥶"
    } else {
        "⚠️"
    }
}

/// Render a provider date as `MM-DD Weekday`, or its raw date part if unparseable.
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.strip_suffix(LOCAL_OFFSET_SUFFIX).unwrap_or(raw);

    match parse_local_date(trimmed) {
        Some(date) => format!(
            "{} {}",
            date.format("%m-%d"),
            WEEKDAYS[date.weekday().num_days_from_monday() as usize]
        ),
        None => raw.split('T').next().unwrap_or(raw).to_string(),
    }
}

fn parse_local_date(s: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

fn round(value: f64) -> i64 {
    if value.is_finite() { value.round() as i64 } else { 0 }
}
