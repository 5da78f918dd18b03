//! Configuration management for the MCP server.
//!
//! Defaults live in the `Default` impls; `Config::from_env` layers
//! environment variables (and a `.env` file, if present) on top.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Resource directory configuration.
    pub resources: ResourcesConfig,

    /// Upstream data services.
    pub upstream: UpstreamConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Resource directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// Directory that resource names are resolved against.
    pub base_path: PathBuf,
}

/// Upstream data service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Open-Meteo base URL.
    pub weather_base_url: String,

    /// CoinGecko base URL.
    pub crypto_base_url: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: f64,

    /// Serve fallback values without calling upstream, on every transport.
    pub force_fallback: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("resources/docs"),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            weather_base_url: "https://api.open-meteo.com".to_string(),
            crypto_base_url: "https://api.coingecko.com".to_string(),
            timeout_secs: 5.0,
            force_fallback: false,
        }
    }
}

impl UpstreamConfig {
    /// The per-call timeout.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs).unwrap_or(Duration::from_secs(5))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "mcp-demo".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            resources: ResourcesConfig::default(),
            upstream: UpstreamConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Variables are prefixed with `MCP_`: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`,
    /// `MCP_LOG_TIMESTAMPS`, `MCP_RESOURCES_BASE_PATH`, `MCP_WEATHER_URL`, `MCP_CRYPTO_URL`,
    /// `MCP_HTTP_TIMEOUT_SECS`, `MCP_FORCE_FALLBACK`, plus the transport
    /// variables read by [`TransportConfig::from_env`]. Unparseable values
    /// are logged and ignored.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(timestamps) = std::env::var("MCP_LOG_TIMESTAMPS") {
            config.logging.with_timestamps = is_truthy(&timestamps);
        }

        if let Ok(base_path) = std::env::var("MCP_RESOURCES_BASE_PATH") {
            config.resources.base_path = PathBuf::from(base_path);
        }

        if let Ok(url) = std::env::var("MCP_WEATHER_URL") {
            config.upstream.weather_base_url = url;
        }

        if let Ok(url) = std::env::var("MCP_CRYPTO_URL") {
            config.upstream.crypto_base_url = url;
        }

        if let Ok(timeout) = std::env::var("MCP_HTTP_TIMEOUT_SECS") {
            match timeout.parse::<f64>() {
                Ok(secs) => config.upstream.timeout_secs = secs,
                Err(_) => warn!("Ignoring invalid MCP_HTTP_TIMEOUT_SECS: {}", timeout),
            }
        }

        if let Ok(force) = std::env::var("MCP_FORCE_FALLBACK") {
            config.upstream.force_fallback = is_truthy(&force);
            if config.upstream.force_fallback {
                info!("Upstream calls disabled: serving fallback values");
            }
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        config
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.name.trim().is_empty() {
            return Err(Error::config("server name must not be empty"));
        }
        if !self.upstream.timeout_secs.is_finite() || self.upstream.timeout_secs <= 0.0 {
            return Err(Error::config(format!(
                "upstream timeout must be a positive number of seconds, got {}",
                self.upstream.timeout_secs
            )));
        }
        if !self.resources.base_path.is_dir() {
            warn!(
                "Resource directory {} does not exist; file and invoice tools will report not found",
                self.resources.base_path.display()
            );
        }
        Ok(())
    }
}

/// `1`, `true` or `yes`, case-insensitive.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
