//! MCP Server implementation and lifecycle management.
//!
//! [`McpServer`] owns the dispatcher shared by every surface. The rmcp
//! `ServerHandler` impl serves stdio; the HTTP transports reach the same
//! dispatcher through [`McpServer::call_tool`], and the REST surface through
//! [`McpServer::route_synthesizer`].

use rmcp::{
    ErrorData as McpError, ServerHandler, handler::server::tool::ToolRouter, model::*,
    tool_handler,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::Config;
use super::security::AuthGate;
use crate::domains::tools::{
    CapabilityRegistry, Dispatcher, RegistryError, RouteSynthesizer, ToolContext,
    build_tool_router, router::into_call_tool_result,
};

const INSTRUCTIONS: &str = "Tool hub exposing calculation, time, web search, webpage fetching, \
     note-taking and file tools. Tool names follow <namespace>_<operation>.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Single entry point into every operation.
    dispatcher: Dispatcher,

    /// Tool router for handling tool calls over rmcp.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Build the server with every built-in capability registered.
    ///
    /// Fails when a capability cannot be described or collides with another.
    pub fn from_config(config: Arc<Config>) -> Result<Self, RegistryError> {
        let registry = CapabilityRegistry::for_config(&config)?.freeze();
        Ok(Self::with_registry(config, registry))
    }

    /// Build the server around an existing registry.
    pub fn with_registry(config: Arc<Config>, registry: Arc<CapabilityRegistry>) -> Self {
        let gate = Arc::new(AuthGate::new(&config.auth));
        if !gate.is_enforcing() {
            info!("No API_BEARER_TOKEN set, accepting unauthenticated calls");
        }
        let dispatcher = Dispatcher::new(registry, gate, ToolContext::new(config.clone()));

        Self {
            tool_router: build_tool_router::<Self>(dispatcher.clone()),
            dispatcher,
            config,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    /// REST surface over the same dispatcher.
    pub fn route_synthesizer(&self) -> RouteSynthesizer {
        RouteSynthesizer::new(self.dispatcher.clone())
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools as MCP JSON.
    pub fn list_tools(&self) -> Vec<Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name with the caller's credential.
    #[instrument(skip(self, credential, arguments))]
    pub async fn call_tool(
        &self,
        credential: Option<&str>,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, McpError> {
        into_call_tool_result(self.dispatcher.invoke_tool(credential, name, arguments).await)
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AuthConfig;
    use serde_json::json;

    fn server(token: Option<&str>) -> McpServer {
        let config = Config {
            auth: AuthConfig {
                token: token.map(String::from),
            },
            ..Default::default()
        };
        McpServer::from_config(Arc::new(config)).unwrap()
    }

    #[test]
    fn test_list_tools_matches_registry() {
        let server = server(None);
        let tools = server.list_tools();
        assert_eq!(tools.len(), server.dispatcher().registry().tool_names().len());
        assert!(tools.iter().any(|t| t["name"] == "web_search_brave"));
    }

    #[tokio::test]
    async fn test_call_tool_uses_credential() {
        let server = server(Some("secret"));
        let args = json!({ "expression": "1 + 1" });

        assert!(server.call_tool(None, "calc_evaluate", args.clone()).await.is_err());
        let result = server
            .call_tool(Some("secret"), "calc_evaluate", args)
            .await
            .unwrap();
        assert_eq!(result.structured_content, Some(json!({ "result": 2 })));
    }
}
