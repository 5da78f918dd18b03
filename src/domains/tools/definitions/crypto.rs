//! Crypto price tool definition.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::domains::tools::{ToolContext, ToolDefinition, ToolError, ToolParams};
use crate::domains::upstream::{CryptoAdapter, CryptoQuery, CryptoQuote};

/// Parameters for the crypto tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CryptoParams {
    /// Coin symbol: btc, eth or sol (case-insensitive).
    pub symbol: String,

    /// Quote currency.
    #[serde(default = "default_vs")]
    pub vs: String,
}

fn default_vs() -> String {
    "usd".to_string()
}

impl ToolParams for CryptoParams {
    fn validate(&self) -> Result<(), ToolError> {
        CryptoQuery::new(&self.symbol, &self.vs)?;
        Ok(())
    }
}

/// Spot price for a supported coin.
pub struct CryptoTool {
    adapter: CryptoAdapter,
}

impl CryptoTool {
    pub fn new(adapter: CryptoAdapter) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl ToolDefinition for CryptoTool {
    const NAME: &'static str = "crypto";

    const DESCRIPTION: &'static str = "Spot price of btc, eth or sol in a quote currency (default usd). Falls back to fixed prices when the upstream service is unavailable.";

    type Params = CryptoParams;
    type Output = CryptoQuote;

    #[instrument(skip_all, fields(symbol = %params.symbol))]
    async fn run(&self, params: CryptoParams, ctx: &ToolContext) -> Result<CryptoQuote, ToolError> {
        let query = CryptoQuery::new(&params.symbol, &params.vs)?;
        info!("Crypto tool called for {}/{}", query.coin.symbol(), query.vs);
        Ok(self.adapter.quote(&query, ctx.bypass_remote).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::UpstreamConfig;
    use crate::domains::tools::ToolHandler;
    use serde_json::json;

    fn tool() -> CryptoTool {
        let config = UpstreamConfig {
            crypto_base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1.0,
            ..UpstreamConfig::default()
        };
        CryptoTool::new(CryptoAdapter::new(reqwest::Client::new(), &config))
    }

    #[tokio::test]
    async fn test_fallback_prices() {
        let ctx = ToolContext::new(true);
        for (symbol, price) in [("BTC", 50000.0), ("eth", 3500.0), ("Sol", 150.0)] {
            let value = tool().execute(json!({"symbol": symbol}), &ctx).await.unwrap();
            assert_eq!(value["price"], price);
            assert_eq!(value["vs"], "usd");
            assert_eq!(value["source"], "fallback");
        }
    }

    #[tokio::test]
    async fn test_vs_is_lowercased() {
        let value = tool()
            .execute(json!({"symbol": "btc", "vs": "EUR"}), &ToolContext::new(true))
            .await
            .unwrap();
        assert_eq!(value["symbol"], "btc");
        assert_eq!(value["vs"], "eur");
    }

    #[tokio::test]
    async fn test_unsupported_symbol() {
        for symbol in ["doge", "", "bitcoin"] {
            let result = tool()
                .execute(json!({"symbol": symbol}), &ToolContext::new(false))
                .await;
            assert!(matches!(result, Err(ToolError::InvalidArgument(_))));
        }
    }

    #[tokio::test]
    async fn test_missing_symbol() {
        let result = tool().execute(json!({"vs": "usd"}), &ToolContext::new(true)).await;
        assert!(matches!(result, Err(ToolError::InvalidArgument(_))));
    }
}
