//! Weather forecast tool definition.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::domains::tools::{ToolContext, ToolDefinition, ToolError, ToolParams};
use crate::domains::upstream::{WeatherAdapter, WeatherForecast, WeatherQuery};

/// Parameters for the weather tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WeatherParams {
    /// City name (chicago, new york, london). Mutually exclusive with lat/lon.
    #[serde(default)]
    pub city: Option<String>,

    /// Latitude in degrees, together with `lon`.
    #[serde(default)]
    #[schemars(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,

    /// Longitude in degrees, together with `lat`.
    #[serde(default)]
    #[schemars(range(min = -180.0, max = 180.0))]
    pub lon: Option<f64>,

    /// Number of forecast days.
    #[serde(default = "default_days")]
    #[schemars(range(min = 1, max = 7))]
    pub days: i64,
}

fn default_days() -> i64 {
    1
}

impl WeatherParams {
    fn to_query(&self) -> Result<WeatherQuery, ToolError> {
        Ok(WeatherQuery::new(
            self.city.as_deref(),
            self.lat,
            self.lon,
            self.days,
        )?)
    }
}

impl ToolParams for WeatherParams {
    fn validate(&self) -> Result<(), ToolError> {
        self.to_query().map(|_| ())
    }
}

/// Daily forecast by city or coordinates.
pub struct WeatherTool {
    adapter: WeatherAdapter,
}

impl WeatherTool {
    pub fn new(adapter: WeatherAdapter) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl ToolDefinition for WeatherTool {
    const NAME: &'static str = "weather";

    const DESCRIPTION: &'static str = "Daily weather forecast (max/min temperature, precipitation) for a known city or a lat/lon pair, 1 to 7 days. Falls back to a fixed forecast when the upstream service is unavailable.";

    type Params = WeatherParams;
    type Output = WeatherForecast;

    #[instrument(skip_all, fields(days = params.days))]
    async fn run(&self, params: WeatherParams, ctx: &ToolContext) -> Result<WeatherForecast, ToolError> {
        let query = params.to_query()?;
        info!("Weather tool called for {}", query.location);
        Ok(self.adapter.forecast(&query, ctx.bypass_remote).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::UpstreamConfig;
    use crate::domains::tools::ToolHandler;
    use crate::domains::upstream::Provenance;
    use serde_json::json;

    fn tool() -> WeatherTool {
        let config = UpstreamConfig {
            weather_base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1.0,
            ..UpstreamConfig::default()
        };
        WeatherTool::new(WeatherAdapter::new(reqwest::Client::new(), &config))
    }

    fn bypass() -> ToolContext {
        ToolContext::new(true)
    }

    #[tokio::test]
    async fn test_days_entries_in_order() {
        for days in 1..=7 {
            let value = tool()
                .execute(json!({"city": "London", "days": days}), &bypass())
                .await
                .unwrap();
            let forecast: WeatherForecast = serde_json::from_value(value).unwrap();
            assert_eq!(forecast.daily.len(), days as usize);
            assert!(forecast.daily.windows(2).all(|w| w[0].date < w[1].date));
            assert_eq!(forecast.source, Provenance::Fallback);
        }
    }

    #[tokio::test]
    async fn test_days_defaults_to_one() {
        let value = tool()
            .execute(json!({"lat": 10.0, "lon": 20.0}), &bypass())
            .await
            .unwrap();
        assert_eq!(value["daily"].as_array().unwrap().len(), 1);
        assert_eq!(value["location"], "10.0,20.0");
        assert_eq!(value["source"], "fallback");
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let cases = [
            json!({"city": "Atlantis"}),
            json!({}),
            json!({"lat": 1.0}),
            json!({"city": "London", "lat": 1.0, "lon": 2.0}),
            json!({"city": "London", "days": 0}),
            json!({"city": "London", "days": 8}),
            json!({"city": "London", "days": "three"}),
            json!({"lat": 91.0, "lon": 0.0}),
        ];
        for args in cases {
            let result = tool().execute(args.clone(), &bypass()).await;
            assert!(
                matches!(result, Err(ToolError::InvalidArgument(_))),
                "expected InvalidArgument for {}",
                args
            );
        }
    }

    #[test]
    fn test_schema_declares_day_bounds() {
        let tool = WeatherTool::to_tool();
        let days = &tool.input_schema["properties"]["days"];
        assert_eq!(days["minimum"], 1);
        assert_eq!(days["maximum"], 7);
    }
}
