//! Error types and handling for the tool hub.
//!
//! Each domain owns its error enum; this module unifies them for callers
//! that only need to report a failure, such as startup code.

use thiserror::Error;

use super::transport::TransportError;
use crate::domains::tools::{RegistryError, ToolError};

/// A specialized Result type for tool hub operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the tool hub.
#[derive(Debug, Error)]
pub enum Error {
    /// Capability registration failed.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Error originating from the tools domain.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Transport failed to start or stopped unexpectedly.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from file operations or network communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
