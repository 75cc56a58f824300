//! Tool hub entry point.
//!
//! Parses the command line, initializes logging, loads configuration, and
//! starts the selected surface.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use tool_hub_server::core::{Config, McpServer, McpTransport, ServerMode, TransportService};

/// Expose the built-in tools over REST/OpenAPI or MCP.
#[derive(Debug, Parser)]
#[command(name = "tool-hub", version, about)]
struct Cli {
    /// Address to bind HTTP transports to.
    #[arg(long, env = "TOOLHUB_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port for HTTP transports.
    #[arg(long, env = "TOOLHUB_PORT", default_value_t = 8000)]
    port: u16,

    /// Protocol surface to expose.
    #[arg(long, value_enum, default_value_t = ServerMode::OpenApi)]
    mode: ServerMode,

    /// Transport used in MCP mode.
    #[arg(long, value_enum, default_value_t = McpTransport::StreamableHttp)]
    mcp_transport: McpTransport,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "TOOLHUB_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging before configuration so its warnings are visible
    init_logging(&cli.log_level);

    let mut config = Config::from_env();
    config.logging.level = cli.log_level;
    config.transport.host = cli.host;
    config.transport.port = cli.port;
    config.transport.mode = cli.mode;
    config.transport.mcp_transport = cli.mcp_transport;
    let config = Arc::new(config);

    info!("Starting {} v{}", config.server.name, config.server.version);

    let server = McpServer::from_config(config.clone()).context("Failed to register capabilities")?;

    info!(
        tools = server.dispatcher().registry().tool_names().len(),
        "Server initialized"
    );

    let transport = TransportService::new(config.transport.clone());
    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Output goes to stderr so the stdio transport owns stdout.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
