//! Transport layer for the MCP server.
//!
//! This module provides different transport implementations:
//! - **STDIO**: line-delimited JSON-RPC on stdin/stdout (default) - feature: `stdio`
//! - **TCP**: line-delimited JSON-RPC over raw TCP sockets - feature: `tcp`
//! - **HTTP**: REST tool endpoints plus JSON-RPC over POST - feature: `http`
//!
//! Every transport hands decoded messages to the shared
//! [`Dispatcher`](crate::core::Dispatcher); none of them contain protocol
//! logic of their own.

mod config;
mod error;
pub mod line;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use line::{Inbound, LineTransport, Transport, serve_session};
pub use service::TransportService;

#[cfg(feature = "tcp")]
pub use config::TcpConfig;

#[cfg(feature = "http")]
pub use config::HttpConfig;
