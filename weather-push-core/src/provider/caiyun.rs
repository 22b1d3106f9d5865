use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::{
    error::ReportError,
    model::{
        AirQuality, AlertEvent, DailyForecastEntry, Forecast, HourlySample, LifeIndexEntry,
        Location, WeatherSnapshot,
    },
};

use super::{WeatherProvider, truncate_body};

pub const CAIYUN_API_BASE: &str = "https://api.caiyunapp.com/v2.6";

const TIMEOUT: Duration = Duration::from_secs(10);

/// Caiyun weather API (v2.6), full `weather.json` bundle.
#[derive(Debug, Clone)]
pub struct CaiyunProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl CaiyunProvider {
    pub fn new(api_key: &str) -> reqwest::Result<Self> {
        Self::with_base_url(api_key, CAIYUN_API_BASE)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> reqwest::Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::builder().timeout(TIMEOUT).build()?,
        })
    }
}

#[async_trait]
impl WeatherProvider for CaiyunProvider {
    #[instrument(skip(self), fields(location = %location.name))]
    async fn fetch(&self, location: &Location) -> Result<Forecast, ReportError> {
        let url = format!("{}/{}/{}/weather.json", self.base_url, self.api_key, location.coords);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("alert", "true"),
                ("dailysteps", "3"),
                ("hourlysteps", "24"),
                ("unit", "metric:v2"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ReportError::Status(format!("HTTP {status}: {}", truncate_body(&body))));
        }

        let parsed: CyResponse = serde_json::from_str(&body)?;

        if parsed.status != "ok" {
            let detail = parsed.error.unwrap_or_else(|| parsed.status.clone());
            return Err(ReportError::Status(detail));
        }

        let result = parsed.result.ok_or_else(|| ReportError::missing("result"))?;
        let forecast = result.into_forecast()?;

        debug!(
            hourly = forecast.hourly.len(),
            daily = forecast.daily.len(),
            alerts = forecast.alerts.len(),
            "Fetched Caiyun forecast"
        );

        Ok(forecast)
    }
}

#[derive(Debug, Deserialize)]
struct CyResponse {
    #[serde(default)]
    status: String,
    error: Option<String>,
    result: Option<CyResult>,
}

#[derive(Debug, Deserialize)]
struct CyResult {
    realtime: Option<CyRealtime>,
    #[serde(default, deserialize_with = "lenient")]
    hourly: CyHourly,
    #[serde(default, deserialize_with = "lenient")]
    daily: CyDaily,
    #[serde(default, deserialize_with = "lenient")]
    alert: CyAlert,
    #[serde(default, deserialize_with = "lenient")]
    forecast_keypoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyRealtime {
    #[serde(deserialize_with = "lenient")]
    skycon: String,
    #[serde(deserialize_with = "lenient")]
    temperature: f64,
    #[serde(deserialize_with = "lenient")]
    apparent_temperature: f64,
    #[serde(deserialize_with = "lenient")]
    humidity: f64,
    #[serde(deserialize_with = "lenient")]
    wind: CyWind,
    #[serde(deserialize_with = "lenient")]
    precipitation: CyRealtimePrecipitation,
    #[serde(deserialize_with = "lenient")]
    air_quality: Option<CyAirQuality>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyWind {
    #[serde(deserialize_with = "lenient")]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyRealtimePrecipitation {
    #[serde(deserialize_with = "lenient")]
    local: CyIntensity,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyIntensity {
    #[serde(deserialize_with = "lenient")]
    intensity: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyAirQuality {
    #[serde(deserialize_with = "lenient")]
    aqi: CyAqi,
    #[serde(deserialize_with = "lenient")]
    description: CyAqiDescription,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyAqi {
    #[serde(deserialize_with = "lenient")]
    chn: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyAqiDescription {
    #[serde(deserialize_with = "lenient")]
    chn: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyHourly {
    #[serde(deserialize_with = "lenient")]
    precipitation: Vec<CyHourlyPrecipitation>,
    #[serde(deserialize_with = "lenient")]
    skycon: Vec<CyValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyHourlyPrecipitation {
    #[serde(deserialize_with = "lenient")]
    datetime: String,
    #[serde(deserialize_with = "lenient")]
    probability: f64,
}

/// `{date|datetime, value}` pairs used for skycons and descriptions.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyValue {
    #[serde(alias = "datetime", deserialize_with = "lenient")]
    date: String,
    #[serde(deserialize_with = "lenient")]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyDaily {
    #[serde(deserialize_with = "lenient")]
    temperature: Vec<CyRange>,
    #[serde(deserialize_with = "lenient")]
    skycon: Vec<CyValue>,
    #[serde(deserialize_with = "lenient")]
    precipitation: Vec<CyDailyPrecipitation>,
    #[serde(deserialize_with = "lenient")]
    humidity: Vec<CyRange>,
    #[serde(deserialize_with = "lenient")]
    description: Vec<CyValue>,
    #[serde(deserialize_with = "lenient")]
    life_index: CyLifeIndex,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyRange {
    #[serde(deserialize_with = "lenient")]
    date: String,
    #[serde(deserialize_with = "lenient")]
    min: f64,
    #[serde(deserialize_with = "lenient")]
    max: f64,
    #[serde(deserialize_with = "lenient")]
    avg: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyDailyPrecipitation {
    #[serde(deserialize_with = "lenient")]
    probability: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyLifeIndex {
    #[serde(deserialize_with = "lenient")]
    ultraviolet: Vec<CyIndex>,
    #[serde(deserialize_with = "lenient")]
    dressing: Vec<CyIndex>,
    #[serde(deserialize_with = "lenient")]
    comfort: Vec<CyIndex>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyIndex {
    #[serde(deserialize_with = "lenient")]
    date: String,
    index: serde_json::Value,
    #[serde(deserialize_with = "lenient")]
    desc: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyAlert {
    #[serde(deserialize_with = "lenient")]
    content: Vec<CyAlertContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CyAlertContent {
    #[serde(deserialize_with = "lenient")]
    title: String,
    #[serde(deserialize_with = "lenient")]
    description: String,
    #[serde(alias = "expires", deserialize_with = "lenient")]
    expire_timestamp: Option<i64>,
}

/// Null or mistyped leaves fall back to their default instead of failing the payload.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

impl CyResult {
    fn into_forecast(self) -> Result<Forecast, ReportError> {
        let realtime = self.realtime.ok_or_else(|| ReportError::missing("result.realtime"))?;

        Ok(Forecast {
            realtime: realtime.into(),
            hourly: self.hourly.into_samples(),
            life_index: self.daily.life_index.entries(),
            daily: self.daily.entries(),
            alerts: self.alert.content.into_iter().map(Into::into).collect(),
            keypoint: self.forecast_keypoint,
        })
    }
}

impl CyDaily {
    /// One entry per day; the skycon series drives the dates, temperatures fill in.
    fn entries(&self) -> Vec<DailyForecastEntry> {
        let days = self.skycon.len().max(self.temperature.len());

        (0..days)
            .map(|i| {
                let temperature = self.temperature.get(i);
                DailyForecastEntry {
                    date: self
                        .skycon
                        .get(i)
                        .map(|s| s.date.clone())
                        .or_else(|| temperature.map(|t| t.date.clone()))
                        .unwrap_or_default(),
                    skycon: self.skycon.get(i).map(|s| s.value.clone()).unwrap_or_default(),
                    min_temperature: temperature.map_or(0.0, |t| t.min),
                    max_temperature: temperature.map_or(0.0, |t| t.max),
                    precipitation_probability: self
                        .precipitation
                        .get(i)
                        .map_or(0.0, |p| p.probability),
                    humidity: self.humidity.get(i).map_or(0.0, |h| h.avg),
                    description: self.description.get(i).map(|d| d.value.clone()),
                }
            })
            .collect()
    }
}

impl From<CyRealtime> for WeatherSnapshot {
    fn from(raw: CyRealtime) -> Self {
        Self {
            skycon: raw.skycon,
            temperature: raw.temperature,
            apparent_temperature: raw.apparent_temperature,
            wind_speed: raw.wind.speed,
            humidity: raw.humidity,
            precipitation_intensity: raw.precipitation.local.intensity,
            air_quality: raw.air_quality.map(|aq| AirQuality {
                aqi: aq.aqi.chn,
                description: aq.description.chn,
            }),
        }
    }
}

impl From<CyAlertContent> for AlertEvent {
    fn from(raw: CyAlertContent) -> Self {
        Self {
            title: raw.title,
            description: raw.description,
            expires_at: raw.expire_timestamp.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        }
    }
}

impl CyHourly {
    fn into_samples(self) -> Vec<HourlySample> {
        let skycons = self.skycon;

        self.precipitation
            .into_iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let Some(timestamp) = parse_timestamp(&p.datetime) else {
                    debug!(datetime = %p.datetime, "Skipping hourly sample with bad timestamp");
                    return None;
                };
                Some(HourlySample {
                    timestamp,
                    probability: p.probability,
                    skycon: skycons.get(i).map(|s| s.value.clone()).unwrap_or_default(),
                })
            })
            .collect()
    }
}

impl CyLifeIndex {
    fn entries(&self) -> Vec<LifeIndexEntry> {
        self.ultraviolet
            .iter()
            .enumerate()
            .map(|(i, uv)| LifeIndexEntry {
                date: uv.date.clone(),
                ultraviolet: index_text(&uv.index),
                dressing: self.dressing.get(i).map(|d| d.desc.clone()).unwrap_or_default(),
                comfort: self.comfort.get(i).map(|c| c.desc.clone()).unwrap_or_default(),
            })
            .collect()
    }
}

fn index_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Caiyun timestamps look like `2024-06-01T10:00+08:00` (no seconds).
fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn location() -> Location {
        Location { name: "Shanghai".into(), coords: "121.4737,31.2304".into() }
    }

    fn payload() -> serde_json::Value {
        json!({
            "status": "ok",
            "result": {
                "realtime": {
                    "skycon": "CLOUDY",
                    "temperature": 24.5,
                    "apparent_temperature": 26.0,
                    "humidity": 0.8,
                    "wind": {"speed": 3.2, "direction": 90.0},
                    "precipitation": {"local": {"intensity": 0.0}},
                    "air_quality": {"aqi": {"chn": 42}, "description": {"chn": "优"}}
                },
                "hourly": {
                    "precipitation": [
                        {"datetime": "2024-06-01T10:00+08:00", "value": 0.5, "probability": 40},
                        {"datetime": "2024-06-01T11:00+08:00", "value": 1.5, "probability": 80},
                        {"datetime": "not-a-date", "value": 0.0, "probability": 90}
                    ],
                    "skycon": [
                        {"datetime": "2024-06-01T10:00+08:00", "value": "LIGHT_RAIN"},
                        {"datetime": "2024-06-01T11:00+08:00", "value": "MODERATE_RAIN"}
                    ]
                },
                "daily": {
                    "temperature": [
                        {"date": "2024-06-01T00:00+08:00", "max": 28.0, "min": 21.0, "avg": 24.0}
                    ],
                    "skycon": [{"date": "2024-06-01T00:00+08:00", "value": "LIGHT_RAIN"}],
                    "precipitation": [{"date": "2024-06-01T00:00+08:00", "probability": 60}],
                    "humidity": [{"date": "2024-06-01T00:00+08:00", "max": 0.9, "min": 0.6, "avg": 0.75}],
                    "life_index": {
                        "ultraviolet": [{"date": "2024-06-01T00:00+08:00", "index": "3", "desc": "弱"}],
                        "dressing": [{"date": "2024-06-01T00:00+08:00", "index": "4", "desc": "舒适"}],
                        "comfort": [{"date": "2024-06-01T00:00+08:00", "index": "5", "desc": "温暖"}]
                    }
                },
                "alert": {
                    "status": "ok",
                    "content": [
                        {"title": "暴雨蓝色预警", "description": "注意防范", "expire_timestamp": 1717300000}
                    ]
                },
                "forecast_keypoint": "未来两小时不会下雨"
            }
        })
    }

    async fn provider_for(server: &MockServer) -> CaiyunProvider {
        CaiyunProvider::with_base_url("test_key", &server.uri()).unwrap()
    }

    #[tokio::test]
    async fn fetch_decodes_full_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/test_key/121.4737,31.2304/weather.json"))
            .and(query_param("alert", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload()))
            .mount(&server)
            .await;

        let forecast = provider_for(&server).await.fetch(&location()).await.unwrap();

        assert_eq!(forecast.realtime.skycon, "CLOUDY");
        assert_eq!(forecast.realtime.wind_speed, 3.2);
        assert_eq!(forecast.realtime.air_quality.as_ref().unwrap().description, "优");
        assert_eq!(forecast.hourly.len(), 2);
        assert_eq!(forecast.hourly[1].skycon, "MODERATE_RAIN");
        assert_eq!(forecast.hourly[1].probability, 80.0);
        assert_eq!(forecast.daily.len(), 1);
        assert_eq!(forecast.daily[0].max_temperature, 28.0);
        assert_eq!(forecast.daily[0].humidity, 0.75);
        assert_eq!(forecast.daily[0].precipitation_probability, 60.0);
        assert_eq!(forecast.life_index[0].ultraviolet, "3");
        assert_eq!(forecast.life_index[0].comfort, "温暖");
        assert_eq!(forecast.alerts.len(), 1);
        assert!(forecast.alerts[0].expires_at.is_some());
        assert_eq!(forecast.keypoint.as_deref(), Some("未来两小时不会下雨"));
    }

    #[tokio::test]
    async fn missing_optional_blocks_default_to_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "result": {"realtime": {"temperature": 10.0}}
            })))
            .mount(&server)
            .await;

        let forecast = provider_for(&server).await.fetch(&location()).await.unwrap();

        assert_eq!(forecast.realtime.temperature, 10.0);
        assert_eq!(forecast.realtime.humidity, 0.0);
        assert!(forecast.realtime.air_quality.is_none());
        assert!(forecast.hourly.is_empty());
        assert!(forecast.daily.is_empty());
        assert!(forecast.alerts.is_empty());
    }

    #[tokio::test]
    async fn null_and_mistyped_fields_default_to_zero() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "result": {
                    "realtime": {"temperature": 10.0, "humidity": null, "wind": "calm"},
                    "daily": {
                        "skycon": [{"date": "2024-06-01T00:00+08:00", "value": null}],
                        "precipitation": [{"probability": "n/a"}]
                    },
                    "forecast_keypoint": 42
                }
            })))
            .mount(&server)
            .await;

        let forecast = provider_for(&server).await.fetch(&location()).await.unwrap();

        assert_eq!(forecast.realtime.temperature, 10.0);
        assert_eq!(forecast.realtime.humidity, 0.0);
        assert_eq!(forecast.realtime.wind_speed, 0.0);
        assert_eq!(forecast.daily.len(), 1);
        assert_eq!(forecast.daily[0].skycon, "");
        assert_eq!(forecast.daily[0].precipitation_probability, 0.0);
        assert!(forecast.keypoint.is_none());
    }

    #[tokio::test]
    async fn missing_realtime_is_a_missing_field_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "result": {}})),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server).await.fetch(&location()).await.unwrap_err();
        assert!(matches!(err, ReportError::MissingField(ref f) if f == "result.realtime"));
    }

    #[tokio::test]
    async fn non_ok_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "failed",
                "error": "'token is invalid'"
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server).await.fetch(&location()).await.unwrap_err();
        assert!(matches!(err, ReportError::Status(ref s) if s.contains("token is invalid")));
    }

    #[tokio::test]
    async fn http_error_is_reported_as_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let err = provider_for(&server).await.fetch(&location()).await.unwrap_err();
        assert!(matches!(err, ReportError::Status(ref s) if s.contains("500")));
    }

    #[tokio::test]
    async fn invalid_json_is_a_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let err = provider_for(&server).await.fetch(&location()).await.unwrap_err();
        assert!(matches!(err, ReportError::Parse(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let provider = CaiyunProvider::with_base_url("k", "http://127.0.0.1:1").unwrap();

        let err = provider.fetch(&location()).await.unwrap_err();
        assert!(matches!(err, ReportError::Network(_)));
        assert!(err.user_message().starts_with("🌐 Network error"));
    }

    #[tokio::test]
    async fn network_error_text_does_not_leak_api_key() {
        let provider =
            CaiyunProvider::with_base_url("SECRET_API_KEY", "http://127.0.0.1:1").unwrap();

        let err = provider.fetch(&location()).await.unwrap_err();

        assert!(!err.user_message().contains("SECRET_API_KEY"));
        assert!(!err.to_string().contains("SECRET_API_KEY"));
    }

    #[test]
    fn parses_caiyun_timestamps() {
        let ts = parse_timestamp("2024-06-01T10:00+08:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-06-01T10:00:00+08:00");
        assert!(parse_timestamp("2024-06-01T10:00:00+08:00").is_some());
        assert!(parse_timestamp("nope").is_none());
    }
}
