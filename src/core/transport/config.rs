//! Transport configuration types.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which surface the process exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    /// REST endpoints with an OpenAPI document.
    #[default]
    #[value(name = "openapi")]
    OpenApi,

    /// Model Context Protocol.
    Mcp,
}

/// MCP transport selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum McpTransport {
    /// JSON-RPC over HTTP POST with session headers.
    #[default]
    StreamableHttp,

    /// Server-sent events with a companion POST endpoint.
    Sse,

    /// Standard input/output.
    Stdio,
}

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    pub mode: ServerMode,

    pub mcp_transport: McpTransport,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path for the streamable-http JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_rpc_path() -> String {
    "/mcp".to_string()
}

fn default_cors() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            mode: ServerMode::default(),
            mcp_transport: McpTransport::default(),
            host: default_host(),
            port: default_port(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
        }
    }
}

impl TransportConfig {
    /// REST/OpenAPI mode on the given address.
    pub fn openapi(host: impl Into<String>, port: u16) -> Self {
        Self {
            mode: ServerMode::OpenApi,
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// MCP mode with the given transport.
    pub fn mcp(transport: McpTransport, host: impl Into<String>, port: u16) -> Self {
        Self {
            mode: ServerMode::Mcp,
            mcp_transport: transport,
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Load the settings that have no command-line flag.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("TOOLHUB_MCP_PATH") {
            config.rpc_path = path;
        }

        config.enable_cors = std::env::var("TOOLHUB_CORS")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        config
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match (self.mode, self.mcp_transport) {
            (ServerMode::OpenApi, _) => format!("REST/OpenAPI on {}", self.address()),
            (ServerMode::Mcp, McpTransport::StreamableHttp) => {
                format!("MCP streamable-http on {}{}", self.address(), self.rpc_path)
            }
            (ServerMode::Mcp, McpTransport::Sse) => format!("MCP SSE on {}/sse", self.address()),
            (ServerMode::Mcp, McpTransport::Stdio) => "MCP STDIO".to_string(),
        }
    }

    /// Check if this transport is STDIO.
    pub fn is_stdio(&self) -> bool {
        self.mode == ServerMode::Mcp && self.mcp_transport == McpTransport::Stdio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.mode, ServerMode::OpenApi);
        assert_eq!(config.address(), "0.0.0.0:8000");
        assert!(!config.is_stdio());
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(
            TransportConfig::mcp(McpTransport::StreamableHttp, "127.0.0.1", 9000).description(),
            "MCP streamable-http on 127.0.0.1:9000/mcp"
        );
        assert!(TransportConfig::mcp(McpTransport::Stdio, "h", 1).is_stdio());
    }

    #[test]
    fn test_cli_value_names() {
        let mode = ServerMode::from_str("openapi", true).unwrap();
        assert_eq!(mode, ServerMode::OpenApi);
        let transport = McpTransport::from_str("streamable-http", true).unwrap();
        assert_eq!(transport, McpTransport::StreamableHttp);
    }
}
