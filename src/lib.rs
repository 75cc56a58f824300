//! Tool Hub Server Library
//!
//! Exposes a fixed set of stateless tool capabilities through two protocol
//! surfaces at once: REST endpoints described by an OpenAPI document, and
//! the Model Context Protocol over streamable HTTP, SSE or stdio. Both
//! surfaces are generated from one capability registry and call through one
//! dispatcher, so every tool behaves identically on either side.
//!
//! # Architecture
//!
//! - **core**: configuration, errors, bearer auth and path validation, the
//!   MCP server handler, and the transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: capability model, registry, dispatch, REST and MCP surfaces
//!   - **search**: search providers with API key rotation, webpage fetching
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tool_hub_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(Config::from_env());
//!     let server = McpServer::from_config(config.clone())?;
//!     TransportService::new(config.transport.clone()).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
