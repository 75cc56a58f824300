//! Tool-specific error types.

use thiserror::Error;

use crate::core::security::AuthError;
use crate::domains::search::{FetchError, SearchError};

/// Errors raised while registering capabilities.
///
/// All of these surface at startup, before any transport is bound.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The capability type cannot be exposed as a tool.
    #[error("Invalid tool shape for '{type_name}': {reason}")]
    InvalidToolShape { type_name: String, reason: String },

    /// Two capabilities resolved to the same namespace.
    #[error("Namespace '{0}' is already registered")]
    DuplicateNamespace(String),

    /// Two operations resolved to the same MCP tool name.
    #[error("Tool name '{0}' is already registered")]
    DuplicateToolName(String),
}

impl RegistryError {
    /// Create a new "invalid tool shape" error.
    pub fn invalid_shape(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidToolShape {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while invoking an operation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments did not match the operation's parameter schema.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The caller did not present a valid credential.
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// A search provider failed or is not configured.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// A webpage could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The requested operation does not exist.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The operation ran but could not complete.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid request" error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a new "execution failed" error.
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable identifier used in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Search(e) => e.kind(),
            Self::Fetch(e) => e.kind(),
            Self::NotFound(_) => "not_found",
            Self::ExecutionFailed(_) => "execution_failed",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the message may be shown to the caller verbatim.
    ///
    /// Internal failures are logged server-side and replaced by a generic
    /// message on the wire.
    pub fn is_client_visible(&self) -> bool {
        !matches!(self, Self::ExecutionFailed(_) | Self::Internal(_))
    }

    /// The message sent to clients.
    pub fn public_message(&self) -> String {
        if self.is_client_visible() {
            self.to_string()
        } else {
            "Internal server error".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domains::search::ProviderId;

    #[test]
    fn test_kind_follows_wrapped_errors() {
        let err = ToolError::from(SearchError::ProviderUnconfigured {
            provider: ProviderId::SearXng,
            hint: "set SEARXNG_URL",
        });
        assert_eq!(err.kind(), "provider_unconfigured");

        let err = ToolError::from(FetchError::FetchTimeout {
            url: "https://example.com".to_string(),
            timeout: Duration::from_secs(1),
        });
        assert_eq!(err.kind(), "fetch_timeout");
    }

    #[test]
    fn test_internal_messages_are_hidden() {
        let err = ToolError::internal("database password is hunter2");
        assert_eq!(err.public_message(), "Internal server error");

        let err = ToolError::invalid_request("missing field `expression`");
        assert!(err.public_message().contains("expression"));
    }
}
