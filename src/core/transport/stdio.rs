//! STDIO transport implementation.
//!
//! Line-delimited JSON-RPC on stdin/stdout. Stdout carries protocol
//! messages only; all logging goes to stderr.

use tokio::io::BufReader;
use tracing::info;

use super::TransportResult;
use super::line::{LineTransport, serve_session};
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Run the STDIO transport until stdin closes.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        info!("Ready - communicating via stdin/stdout");

        let mut transport = LineTransport::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
        serve_session(server.dispatcher(), &mut transport).await?;

        info!("STDIO transport finished");
        Ok(())
    }
}
