//! TCP transport implementation.
//!
//! Line-delimited JSON-RPC over raw TCP. Each connection is its own
//! session with its own initialization state.

use std::net::SocketAddr;

use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use super::line::{LineTransport, serve_session};
use super::{TransportError, TransportResult, config::TcpConfig};
use crate::core::McpServer;

/// TCP transport handler.
pub struct TcpTransport {
    config: TcpConfig,
}

impl TcpTransport {
    /// Create a new TCP transport with the given config.
    pub fn new(config: TcpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Bind and serve until the process exits.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {} (JSON-RPC over TCP)", addr);
        Self::serve(listener, server).await
    }

    /// Accept connections on an already bound listener.
    pub async fn serve(listener: TcpListener, server: McpServer) -> TransportResult<()> {
        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    info!("Accepted connection from {}", peer_addr);

                    // Set TCP_NODELAY to disable Nagle's algorithm
                    if let Err(e) = stream.set_nodelay(true) {
                        warn!("Failed to set TCP_NODELAY for {}: {}", peer_addr, e);
                    }

                    let server = server.clone();
                    tokio::spawn(async move {
                        Self::handle_connection(server, stream, peer_addr).await;
                    });
                }
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    // Small delay to avoid spinning on persistent errors
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                }
            }
        }
    }

    /// Handle a single TCP connection.
    async fn handle_connection(server: McpServer, stream: TcpStream, peer_addr: SocketAddr) {
        let (reader, writer) = stream.into_split();
        let mut transport = LineTransport::new(BufReader::new(reader), writer);

        match serve_session(server.dispatcher(), &mut transport).await {
            Ok(()) => info!("Client {} disconnected cleanly", peer_addr),
            Err(e) => warn!("Error while serving client {}: {}", peer_addr, e),
        }
    }
}
