//! MCP Server Entry Point
//!
//! Initializes logging, loads configuration, and starts the server with the
//! configured transport.

use anyhow::{Context, Result};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use mcp_demo_server::core::{Config, McpServer, TransportService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env();

    // Initialize logging
    init_logging(&config.logging.level, config.logging.with_timestamps);

    config.validate().context("invalid configuration")?;

    info!("Starting {} v{}", config.server.name, config.server.version);
    info!(
        "Resources: {}, upstream timeout: {}s",
        config.resources.base_path.display(),
        config.upstream.timeout_secs
    );

    let server = McpServer::new(config.clone());

    TransportService::new(config.transport)
        .run(server)
        .await
        .context("transport failed")?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr: stdout carries protocol messages.
fn init_logging(level: &str, with_timestamps: bool) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if with_timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}
