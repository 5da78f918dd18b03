//! External data adapters.
//!
//! Each adapter wraps one upstream JSON service and guarantees an answer:
//! a live value when the call succeeds within the timeout, or a fixed local
//! substitute otherwise. Callers learn which one they got from the
//! [`Provenance`] tag, never from an error.
//!
//! - `weather.rs` - Open-Meteo daily forecast
//! - `crypto.rs` - CoinGecko simple price

mod crypto;
mod error;
mod weather;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use crypto::{Coin, CryptoAdapter, CryptoQuery, CryptoQuote};
pub use error::{FetchError, QueryError};
pub use weather::{
    Coordinates, WeatherAdapter, WeatherDay, WeatherForecast, WeatherQuery, fallback_forecast,
    geocode_city,
};

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Provenance {
    /// Live Open-Meteo forecast.
    #[serde(rename = "open-meteo")]
    OpenMeteo,

    /// Live CoinGecko price.
    #[serde(rename = "coingecko")]
    CoinGecko,

    /// Deterministic local substitute.
    #[serde(rename = "fallback")]
    Fallback,
}

impl Provenance {
    /// The wire token for this provenance.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenMeteo => "open-meteo",
            Self::CoinGecko => "coingecko",
            Self::Fallback => "fallback",
        }
    }
}

/// A value tagged with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: Provenance,
}

/// An upstream service with a deterministic local fallback.
#[async_trait]
pub trait DataAdapter: Send + Sync {
    /// Validated query type.
    type Query: Send + Sync;

    /// Value produced either live or by the fallback.
    type Output: Send;

    /// Adapter name used in logs.
    const NAME: &'static str;

    /// Provenance reported for live values.
    const LIVE_SOURCE: Provenance;

    /// Perform one live call. No retries.
    async fn fetch_live(&self, query: &Self::Query) -> Result<Self::Output, FetchError>;

    /// The fixed substitute for `query`.
    fn fallback(&self, query: &Self::Query) -> Self::Output;

    /// Fetch a value, falling back on any failure or when `bypass_remote` is set.
    async fn fetch(&self, query: &Self::Query, bypass_remote: bool) -> Sourced<Self::Output> {
        let live = if bypass_remote {
            Err(FetchError::Bypassed)
        } else {
            self.fetch_live(query).await
        };

        match live {
            Ok(value) => Sourced {
                value,
                source: Self::LIVE_SOURCE,
            },
            Err(FetchError::Bypassed) => {
                debug!(adapter = Self::NAME, "Live call bypassed, serving fallback");
                Sourced {
                    value: self.fallback(query),
                    source: Provenance::Fallback,
                }
            }
            Err(e) => {
                warn!(
                    adapter = Self::NAME,
                    timeout = e.is_timeout(),
                    "Live call failed, serving fallback: {}",
                    e
                );
                Sourced {
                    value: self.fallback(query),
                    source: Provenance::Fallback,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_tokens() {
        assert_eq!(Provenance::OpenMeteo.as_str(), "open-meteo");
        assert_eq!(Provenance::CoinGecko.as_str(), "coingecko");
        assert_eq!(
            serde_json::to_value(Provenance::Fallback).unwrap(),
            serde_json::json!("fallback")
        );
    }
}
