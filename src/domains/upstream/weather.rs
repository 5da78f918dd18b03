//! Weather adapter backed by the Open-Meteo daily forecast API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{DataAdapter, FetchError, Provenance, QueryError};
use crate::core::config::UpstreamConfig;

/// Maximum number of forecast days.
pub const MAX_DAYS: i64 = 7;

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Local gazetteer: the only city names the weather tool understands.
const GAZETTEER: &[(&str, Coordinates)] = &[
    (
        "chicago",
        Coordinates {
            lat: 41.8781,
            lon: -87.6298,
        },
    ),
    (
        "new york",
        Coordinates {
            lat: 40.7128,
            lon: -74.0060,
        },
    ),
    (
        "london",
        Coordinates {
            lat: 51.5074,
            lon: -0.1278,
        },
    ),
];

/// Look a city up in the local gazetteer (trimmed, case-insensitive).
pub fn geocode_city(city: &str) -> Option<Coordinates> {
    let key = city.trim().to_lowercase();
    GAZETTEER
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, coords)| *coords)
}

/// A validated forecast request.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    /// Label echoed back in the forecast: the city as given, or `lat,lon`.
    pub location: String,
    pub coordinates: Coordinates,
    pub days: u8,
}

impl WeatherQuery {
    /// Build a query from a city name XOR an explicit coordinate pair.
    pub fn new(
        city: Option<&str>,
        lat: Option<f64>,
        lon: Option<f64>,
        days: i64,
    ) -> Result<Self, QueryError> {
        if !(1..=MAX_DAYS).contains(&days) {
            return Err(QueryError::DaysOutOfRange(days));
        }
        let days = days as u8;

        let city = city.filter(|c| !c.trim().is_empty());
        match (city, lat, lon) {
            (Some(city), None, None) => {
                let coordinates =
                    geocode_city(city).ok_or_else(|| QueryError::UnknownCity(city.to_string()))?;
                Ok(Self {
                    location: city.to_string(),
                    coordinates,
                    days,
                })
            }
            (None, Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err(QueryError::CoordinatesOutOfRange);
                }
                Ok(Self {
                    location: format!("{lat:?},{lon:?}"),
                    coordinates: Coordinates { lat, lon },
                    days,
                })
            }
            (Some(_), _, _) => Err(QueryError::AmbiguousLocation),
            (None, _, _) => Err(QueryError::MissingLocation),
        }
    }
}

/// One day of forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherDay {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Maximum temperature (°C).
    pub t_max: f64,
    /// Minimum temperature (°C).
    pub t_min: f64,
    /// Precipitation sum (mm).
    pub precip_mm: f64,
}

/// Forecast returned by the weather tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherForecast {
    pub location: String,
    pub daily: Vec<WeatherDay>,
    pub source: Provenance,
}

/// Deterministic forecast: day `i` is `start + i` with 20+i / 10+i degrees and no rain.
pub fn fallback_forecast(days: u8, start: NaiveDate) -> Vec<WeatherDay> {
    (0..days)
        .map(|i| {
            let offset = f64::from(i);
            WeatherDay {
                date: (start + chrono::Duration::days(i64::from(i)))
                    .format("%Y-%m-%d")
                    .to_string(),
                t_max: 20.0 + offset,
                t_min: 10.0 + offset,
                precip_mm: 0.0,
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ForecastPayload {
    daily: DailySeries,
}

#[derive(Debug, Deserialize)]
struct DailySeries {
    time: Vec<String>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    #[serde(default)]
    precipitation_sum: Option<Vec<Option<f64>>>,
}

fn parse_forecast(payload: ForecastPayload, days: u8) -> Result<Vec<WeatherDay>, FetchError> {
    let daily = payload.daily;
    let count = daily.time.len();

    if daily.temperature_2m_max.len() != count || daily.temperature_2m_min.len() != count {
        return Err(FetchError::malformed("daily series have mismatched lengths"));
    }
    if count != usize::from(days) {
        return Err(FetchError::malformed(format!(
            "expected {} days, upstream returned {}",
            days, count
        )));
    }

    let precip = daily.precipitation_sum.unwrap_or_default();
    Ok(daily
        .time
        .into_iter()
        .enumerate()
        .map(|(i, date)| WeatherDay {
            date,
            t_max: daily.temperature_2m_max[i],
            t_min: daily.temperature_2m_min[i],
            precip_mm: precip.get(i).copied().flatten().unwrap_or(0.0),
        })
        .collect())
}

/// Open-Meteo forecast adapter.
#[derive(Debug, Clone)]
pub struct WeatherAdapter {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl WeatherAdapter {
    pub fn new(client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            base_url: config.weather_base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
        }
    }

    /// Fetch a forecast for `query`, tagged with its provenance.
    pub async fn forecast(&self, query: &WeatherQuery, bypass_remote: bool) -> WeatherForecast {
        let sourced = self.fetch(query, bypass_remote).await;
        WeatherForecast {
            location: query.location.clone(),
            daily: sourced.value,
            source: sourced.source,
        }
    }
}

#[async_trait]
impl DataAdapter for WeatherAdapter {
    type Query = WeatherQuery;
    type Output = Vec<WeatherDay>;

    const NAME: &'static str = "weather";
    const LIVE_SOURCE: Provenance = Provenance::OpenMeteo;

    async fn fetch_live(&self, query: &WeatherQuery) -> Result<Vec<WeatherDay>, FetchError> {
        let url = format!("{}/v1/forecast", self.base_url);
        info!(
            "Fetching {}-day forecast for {} from {}",
            query.days, query.location, url
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", query.coordinates.lat.to_string()),
                ("longitude", query.coordinates.lon.to_string()),
                (
                    "daily",
                    "temperature_2m_max,temperature_2m_min,precipitation_sum".to_string(),
                ),
                ("timezone", "UTC".to_string()),
                ("forecast_days", query.days.to_string()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let payload: ForecastPayload = response
            .json()
            .await
            .map_err(|e| FetchError::malformed(e.to_string()))?;
        debug!("Open-Meteo returned {} days", payload.daily.time.len());

        parse_forecast(payload, query.days)
    }

    fn fallback(&self, query: &WeatherQuery) -> Vec<WeatherDay> {
        fallback_forecast(query.days, Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_adapter() -> WeatherAdapter {
        let config = UpstreamConfig {
            weather_base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1.0,
            ..UpstreamConfig::default()
        };
        WeatherAdapter::new(reqwest::Client::new(), &config)
    }

    #[test]
    fn test_geocode_is_case_insensitive() {
        let coords = geocode_city("  New York ").unwrap();
        assert_eq!(coords.lat, 40.7128);
        assert_eq!(coords.lon, -74.0060);
        assert!(geocode_city("LONDON").is_some());
        assert!(geocode_city("paris").is_none());
    }

    #[test]
    fn test_query_city_or_coordinates() {
        let by_city = WeatherQuery::new(Some("Chicago"), None, None, 3).unwrap();
        assert_eq!(by_city.location, "Chicago");
        assert_eq!(by_city.coordinates.lat, 41.8781);

        let by_coords = WeatherQuery::new(None, Some(10.5), Some(-20.0), 1).unwrap();
        assert_eq!(by_coords.location, "10.5,-20.0");
    }

    #[test]
    fn test_query_rejects_bad_location() {
        assert_eq!(
            WeatherQuery::new(None, None, None, 1),
            Err(QueryError::MissingLocation)
        );
        assert_eq!(
            WeatherQuery::new(None, Some(1.0), None, 1),
            Err(QueryError::MissingLocation)
        );
        assert_eq!(
            WeatherQuery::new(Some("London"), Some(1.0), Some(2.0), 1),
            Err(QueryError::AmbiguousLocation)
        );
        assert_eq!(
            WeatherQuery::new(Some("Atlantis"), None, None, 1),
            Err(QueryError::UnknownCity("Atlantis".to_string()))
        );
        assert_eq!(
            WeatherQuery::new(None, Some(91.0), Some(0.0), 1),
            Err(QueryError::CoordinatesOutOfRange)
        );
    }

    #[test]
    fn test_query_days_bounds() {
        assert!(WeatherQuery::new(Some("london"), None, None, 1).is_ok());
        assert!(WeatherQuery::new(Some("london"), None, None, 7).is_ok());
        assert_eq!(
            WeatherQuery::new(Some("london"), None, None, 0),
            Err(QueryError::DaysOutOfRange(0))
        );
        assert_eq!(
            WeatherQuery::new(Some("london"), None, None, 8),
            Err(QueryError::DaysOutOfRange(8))
        );
    }

    #[test]
    fn test_fallback_forecast_values() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        let days = fallback_forecast(3, start);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, "2024-12-30");
        assert_eq!(days[2].date, "2025-01-01");
        assert_eq!(days[2].t_max, 22.0);
        assert_eq!(days[2].t_min, 12.0);
        assert!(days.iter().all(|d| d.precip_mm == 0.0));
    }

    #[test]
    fn test_parse_forecast_payload() {
        let payload: ForecastPayload = serde_json::from_str(
            r#"{"daily": {
                "time": ["2024-05-01", "2024-05-02"],
                "temperature_2m_max": [18.2, 19.5],
                "temperature_2m_min": [9.1, 10.0],
                "precipitation_sum": [1.5, null]
            }}"#,
        )
        .unwrap();
        let days = parse_forecast(payload, 2).unwrap();
        assert_eq!(days[0].precip_mm, 1.5);
        assert_eq!(days[1].precip_mm, 0.0);
        assert_eq!(days[1].t_max, 19.5);
    }

    #[test]
    fn test_parse_forecast_rejects_short_series() {
        let payload: ForecastPayload = serde_json::from_str(
            r#"{"daily": {
                "time": ["2024-05-01"],
                "temperature_2m_max": [18.2],
                "temperature_2m_min": [9.1]
            }}"#,
        )
        .unwrap();
        assert!(matches!(
            parse_forecast(payload, 3),
            Err(FetchError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_bypass_serves_fallback() {
        let adapter = unreachable_adapter();
        let query = WeatherQuery::new(Some("Chicago"), None, None, 7).unwrap();
        let forecast = adapter.forecast(&query, true).await;

        assert_eq!(forecast.source, Provenance::Fallback);
        assert_eq!(forecast.location, "Chicago");
        assert_eq!(forecast.daily.len(), 7);
        for (i, day) in forecast.daily.iter().enumerate() {
            assert_eq!(day.t_max, 20.0 + i as f64);
            assert_eq!(day.t_min, 10.0 + i as f64);
        }
        assert!(forecast.daily.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_falls_back() {
        let adapter = unreachable_adapter();
        let query = WeatherQuery::new(None, Some(1.0), Some(2.0), 2).unwrap();
        let forecast = adapter.forecast(&query, false).await;
        assert_eq!(forecast.source, Provenance::Fallback);
        assert_eq!(forecast.daily.len(), 2);
    }
}
