//! Transport layer.
//!
//! - **rest**: synthesized REST routes with an OpenAPI document
//! - **http**: MCP streamable-http (JSON-RPC over POST with sessions)
//! - **sse**: MCP over server-sent events
//! - **stdio**: MCP over standard input/output via rmcp
//!
//! The HTTP variants share JSON-RPC handling in `jsonrpc` and layers in
//! `common`. All of them reach operations through the same dispatcher.

mod common;
mod config;
mod error;
pub mod http;
pub mod jsonrpc;
pub mod rest;
mod service;
pub mod sse;
pub mod stdio;

pub use config::{McpTransport, ServerMode, TransportConfig};
pub use error::{TransportError, TransportResult};
pub use service::TransportService;
