//! Transport configuration types.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which transport the server runs, selected by `MCP_TRANSPORT`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Line-delimited JSON-RPC on stdin/stdout (default).
    #[cfg(feature = "stdio")]
    Stdio,

    /// Line-delimited JSON-RPC over TCP, one session per connection.
    #[cfg(feature = "tcp")]
    Tcp(TcpConfig),

    /// REST tool endpoints plus JSON-RPC over POST.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// TCP transport configuration.
#[cfg(feature = "tcp")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
}

/// HTTP transport configuration.
#[cfg(feature = "http")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path for the JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

#[cfg(any(feature = "tcp", feature = "http"))]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[cfg(feature = "http")]
fn default_rpc_path() -> String {
    "/mcp".to_string()
}

#[cfg(feature = "http")]
fn default_cors() -> bool {
    true
}

#[cfg(feature = "tcp")]
impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: default_host(),
        }
    }
}

#[cfg(feature = "http")]
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "stdio")]
        {
            return Self::Stdio;
        }

        #[cfg(all(not(feature = "stdio"), feature = "tcp"))]
        {
            return Self::Tcp(TcpConfig::default());
        }

        #[cfg(all(not(feature = "stdio"), not(feature = "tcp"), feature = "http"))]
        {
            return Self::Http(HttpConfig::default());
        }

        #[cfg(not(any(feature = "stdio", feature = "tcp", feature = "http")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio, tcp, or http");
        }
    }
}

/// Read a port from `var`, keeping `default` when unset or invalid.
#[cfg(any(feature = "tcp", feature = "http"))]
fn env_port(var: &str, default: u16) -> u16 {
    match std::env::var(var) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}: {}", var, raw);
            default
        }),
        Err(_) => default,
    }
}

impl TransportConfig {
    /// Load transport config from environment variables.
    ///
    /// `MCP_TRANSPORT` is `stdio`, `tcp` or `http`; an unknown or disabled
    /// value falls back to the default transport.
    pub fn from_env() -> Self {
        let transport = std::env::var("MCP_TRANSPORT")
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match transport.as_str() {
            #[cfg(feature = "tcp")]
            "tcp" => {
                let defaults = TcpConfig::default();
                Self::Tcp(TcpConfig {
                    port: env_port("MCP_TCP_PORT", defaults.port),
                    host: std::env::var("MCP_TCP_HOST").unwrap_or(defaults.host),
                })
            }
            #[cfg(feature = "http")]
            "http" => {
                let defaults = HttpConfig::default();
                Self::Http(HttpConfig {
                    port: env_port("MCP_HTTP_PORT", defaults.port),
                    host: std::env::var("MCP_HTTP_HOST").unwrap_or(defaults.host),
                    rpc_path: std::env::var("MCP_HTTP_PATH").unwrap_or(defaults.rpc_path),
                    enable_cors: std::env::var("MCP_HTTP_CORS")
                        .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0"))
                        .unwrap_or(defaults.enable_cors),
                })
            }
            "" | "stdio" => Self::default(),
            other => {
                warn!("Unknown or disabled MCP_TRANSPORT '{}', using default transport", other);
                Self::default()
            }
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (line-delimited JSON-RPC)".to_string(),
            #[cfg(feature = "tcp")]
            Self::Tcp(cfg) => format!("TCP on {}:{}", cfg.host, cfg.port),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {}:{} (JSON-RPC at {})", cfg.host, cfg.port, cfg.rpc_path),
        }
    }
}
