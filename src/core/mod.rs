//! Core module containing shared infrastructure components.
//!
//! Configuration, the crate-level error, security (bearer auth and path
//! validation), the MCP server handler and the transport layer.

pub mod config;
pub mod error;
pub mod security;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use security::{AuthError, AuthGate, PathSecurityError, validate_path};
pub use server::McpServer;
pub use transport::{McpTransport, ServerMode, TransportConfig, TransportService};
