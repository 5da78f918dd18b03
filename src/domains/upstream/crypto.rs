//! Crypto price adapter backed by the CoinGecko simple price API.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{DataAdapter, FetchError, Provenance, QueryError};
use crate::core::config::UpstreamConfig;

/// Supported coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coin {
    Bitcoin,
    Ethereum,
    Solana,
}

impl Coin {
    /// Map a ticker symbol (case-insensitive) to a coin.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim().to_lowercase().as_str() {
            "btc" => Some(Self::Bitcoin),
            "eth" => Some(Self::Ethereum),
            "sol" => Some(Self::Solana),
            _ => None,
        }
    }

    /// Lowercase ticker symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Bitcoin => "btc",
            Self::Ethereum => "eth",
            Self::Solana => "sol",
        }
    }

    /// CoinGecko coin id.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::Ethereum => "ethereum",
            Self::Solana => "solana",
        }
    }

    /// Fixed price served when the live call is unavailable.
    pub fn fallback_price(&self) -> f64 {
        match self {
            Self::Bitcoin => 50000.0,
            Self::Ethereum => 3500.0,
            Self::Solana => 150.0,
        }
    }
}

/// A validated price request.
#[derive(Debug, Clone, PartialEq)]
pub struct CryptoQuery {
    pub coin: Coin,
    /// Lowercased quote currency.
    pub vs: String,
}

impl CryptoQuery {
    pub fn new(symbol: &str, vs: &str) -> Result<Self, QueryError> {
        let coin = Coin::from_symbol(symbol)
            .ok_or_else(|| QueryError::UnsupportedSymbol(symbol.to_string()))?;
        let vs = vs.trim().to_lowercase();
        if vs.is_empty() {
            return Err(QueryError::EmptyCurrency);
        }
        Ok(Self { coin, vs })
    }
}

/// Price returned by the crypto tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CryptoQuote {
    pub symbol: String,
    pub vs: String,
    pub price: f64,
    pub source: Provenance,
}

/// CoinGecko `simple/price` response: `{ coin_id: { currency: price } }`.
type PricePayload = HashMap<String, HashMap<String, f64>>;

fn extract_price(payload: &PricePayload, query: &CryptoQuery) -> Result<f64, FetchError> {
    payload
        .get(query.coin.id())
        .and_then(|prices| prices.get(&query.vs))
        .copied()
        .ok_or_else(|| {
            FetchError::malformed(format!(
                "no {} price for {} in response",
                query.vs,
                query.coin.id()
            ))
        })
}

/// CoinGecko price adapter.
#[derive(Debug, Clone)]
pub struct CryptoAdapter {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl CryptoAdapter {
    pub fn new(client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            base_url: config.crypto_base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
        }
    }

    /// Fetch a quote for `query`, tagged with its provenance.
    pub async fn quote(&self, query: &CryptoQuery, bypass_remote: bool) -> CryptoQuote {
        let sourced = self.fetch(query, bypass_remote).await;
        CryptoQuote {
            symbol: query.coin.symbol().to_string(),
            vs: query.vs.clone(),
            price: sourced.value,
            source: sourced.source,
        }
    }
}

#[async_trait]
impl DataAdapter for CryptoAdapter {
    type Query = CryptoQuery;
    type Output = f64;

    const NAME: &'static str = "crypto";
    const LIVE_SOURCE: Provenance = Provenance::CoinGecko;

    async fn fetch_live(&self, query: &CryptoQuery) -> Result<f64, FetchError> {
        let url = format!("{}/api/v3/simple/price", self.base_url);
        info!("Fetching {} price in {}", query.coin.id(), query.vs);

        let response = self
            .client
            .get(&url)
            .query(&[("ids", query.coin.id()), ("vs_currencies", query.vs.as_str())])
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let payload: PricePayload = response
            .json()
            .await
            .map_err(|e| FetchError::malformed(e.to_string()))?;

        extract_price(&payload, query)
    }

    fn fallback(&self, query: &CryptoQuery) -> f64 {
        query.coin.fallback_price()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_adapter() -> CryptoAdapter {
        let config = UpstreamConfig {
            crypto_base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1.0,
            ..UpstreamConfig::default()
        };
        CryptoAdapter::new(reqwest::Client::new(), &config)
    }

    #[test]
    fn test_symbol_allow_list() {
        assert_eq!(Coin::from_symbol("BTC"), Some(Coin::Bitcoin));
        assert_eq!(Coin::from_symbol("eth"), Some(Coin::Ethereum));
        assert_eq!(Coin::from_symbol(" sol "), Some(Coin::Solana));
        assert_eq!(Coin::from_symbol("doge"), None);
    }

    #[test]
    fn test_query_rejects_unsupported_symbol() {
        assert_eq!(
            CryptoQuery::new("xrp", "usd"),
            Err(QueryError::UnsupportedSymbol("xrp".to_string()))
        );
        assert_eq!(CryptoQuery::new("btc", " "), Err(QueryError::EmptyCurrency));
    }

    #[test]
    fn test_query_lowercases_currency() {
        let query = CryptoQuery::new("Eth", "EUR").unwrap();
        assert_eq!(query.coin, Coin::Ethereum);
        assert_eq!(query.vs, "eur");
    }

    #[test]
    fn test_extract_price() {
        let payload: PricePayload =
            serde_json::from_str(r#"{"bitcoin": {"usd": 64123.5}}"#).unwrap();
        let query = CryptoQuery::new("btc", "usd").unwrap();
        assert_eq!(extract_price(&payload, &query).unwrap(), 64123.5);

        let query = CryptoQuery::new("btc", "gbp").unwrap();
        assert!(matches!(
            extract_price(&payload, &query),
            Err(FetchError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_bypass_serves_fixed_prices() {
        let adapter = unreachable_adapter();
        for (symbol, expected) in [("btc", 50000.0), ("eth", 3500.0), ("sol", 150.0)] {
            let query = CryptoQuery::new(symbol, "usd").unwrap();
            let quote = adapter.quote(&query, true).await;
            assert_eq!(quote.source, Provenance::Fallback);
            assert_eq!(quote.price, expected);
            assert_eq!(quote.symbol, symbol);
        }
    }

    #[tokio::test]
    async fn test_unreachable_upstream_falls_back() {
        let adapter = unreachable_adapter();
        let query = CryptoQuery::new("sol", "usd").unwrap();
        let quote = adapter.quote(&query, false).await;
        assert_eq!(quote.source, Provenance::Fallback);
        assert_eq!(quote.price, 150.0);
    }
}
