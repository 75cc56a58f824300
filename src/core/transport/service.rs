//! Transport service - starts the surface selected at startup.

use tracing::info;

use super::config::{McpTransport, ServerMode};
use super::http::HttpTransport;
use super::rest::RestTransport;
use super::sse::SseTransport;
use super::stdio::StdioTransport;
use super::{TransportConfig, TransportResult};
use crate::core::McpServer;

/// Transport service - manages the transport layer for the server.
pub struct TransportService {
    config: TransportConfig,
}

impl TransportService {
    /// Create a new transport service with the given configuration.
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Start the transport with the given server.
    ///
    /// This method blocks until the transport is shut down.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        info!("Starting transport: {}", self.config.description());

        match (self.config.mode, self.config.mcp_transport) {
            (ServerMode::OpenApi, _) => RestTransport::new(self.config).run(server).await,
            (ServerMode::Mcp, McpTransport::StreamableHttp) => {
                HttpTransport::new(self.config).run(server).await
            }
            (ServerMode::Mcp, McpTransport::Sse) => SseTransport::new(self.config).run(server).await,
            (ServerMode::Mcp, McpTransport::Stdio) => StdioTransport::run(server).await,
        }
    }
}
