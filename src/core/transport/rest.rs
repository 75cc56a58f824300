//! REST/OpenAPI transport.
//!
//! Serves the synthesized operation routes plus discovery and health
//! endpoints.

use axum::{Json, Router, routing::get};
use serde_json::json;
use tracing::info;

use super::TransportConfig;
use super::TransportResult;
use super::common::{health_check, serve, server_info, with_common_layers};
use crate::core::McpServer;

/// REST transport handler.
pub struct RestTransport {
    config: TransportConfig,
}

impl RestTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Full application router, layers included.
    pub fn router(&self, server: &McpServer) -> Router {
        let synthesizer = server.route_synthesizer();
        let route_count = synthesizer.routes().len();
        let info = server_info(
            server.name(),
            server.version(),
            "REST/OpenAPI",
            json!({
                "openapi": "/openapi.json",
                "docs": "/docs",
                "tools": "/tools",
                "health": "/health",
                "operations": route_count,
            }),
        );

        let app = synthesizer
            .router()
            .route("/health", get(health_check))
            .route("/", get(move || async move { Json(info) }));
        with_common_layers(app, self.config.enable_cors)
    }

    /// Run the REST transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.config.address();
        let app = self.router(&server);

        if server.dispatcher().gate().is_enforcing() {
            info!("Bearer token required on operation routes");
        }
        info!("Ready - listening on {} (REST/OpenAPI)", addr);
        info!("  → Docs:    GET /docs");
        info!("  → Schema:  GET /openapi.json");
        info!("  → Health:  GET /health");

        serve(app, &addr).await
    }
}
