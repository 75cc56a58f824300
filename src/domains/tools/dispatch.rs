//! Dispatcher - the single path from a protocol surface into an operation.
//!
//! Both the REST routes and the MCP tool router call through here, so the
//! auth check, argument validation and panic containment happen exactly
//! once per call regardless of transport.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::ToolError;
use super::capability::{CapabilityDescriptor, OperationDescriptor, ToolContext};
use super::registry::CapabilityRegistry;
use super::spec::validate_arguments;
use crate::core::security::AuthGate;

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    gate: Arc<AuthGate>,
    context: ToolContext,
}

impl Dispatcher {
    pub fn new(registry: Arc<CapabilityRegistry>, gate: Arc<AuthGate>, context: ToolContext) -> Self {
        Self {
            registry,
            gate,
            context,
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    pub fn context(&self) -> &ToolContext {
        &self.context
    }

    /// Check a credential without invoking anything.
    pub fn authorize(&self, credential: Option<&str>) -> Result<(), ToolError> {
        self.gate.authorize(credential).map_err(|e| {
            warn!("Rejected call: {}", e);
            ToolError::from(e)
        })
    }

    /// Invoke `namespace/operation`.
    #[instrument(skip(self, credential, arguments))]
    pub async fn invoke(
        &self,
        credential: Option<&str>,
        namespace: &str,
        operation: &str,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        self.authorize(credential)?;
        let (capability, op) = self
            .registry
            .lookup(namespace, operation)
            .ok_or_else(|| ToolError::not_found(format!("{}/{}", namespace, operation)))?;
        self.run(capability, op, arguments).await
    }

    /// Invoke an operation by its MCP tool name.
    #[instrument(skip(self, credential, arguments))]
    pub async fn invoke_tool(
        &self,
        credential: Option<&str>,
        tool_name: &str,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        self.authorize(credential)?;
        let (capability, op) = self
            .registry
            .lookup_tool(tool_name)
            .ok_or_else(|| ToolError::not_found(tool_name))?;
        self.run(capability, op, arguments).await
    }

    async fn run(
        &self,
        capability: &CapabilityDescriptor,
        op: &OperationDescriptor,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        let arguments = validate_arguments(&op.parameters, arguments)
            .map_err(ToolError::invalid_request)?;

        debug!(namespace = %capability.namespace, operation = op.name, "Dispatching");
        let outcome = AssertUnwindSafe(op.invoke(self.context.clone(), arguments))
            .catch_unwind()
            .await;

        let result = match outcome {
            Ok(result) => result,
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(
                    namespace = %capability.namespace,
                    operation = op.name,
                    "Operation panicked: {}",
                    detail
                );
                return Err(ToolError::internal(detail));
            }
        };

        match &result {
            Ok(value) => {
                if let Err(e) = op.returns.validate(value, "result") {
                    warn!(
                        namespace = %capability.namespace,
                        operation = op.name,
                        "Result does not match declared shape: {}",
                        e
                    );
                }
            }
            Err(e) if !e.is_client_visible() => error!(
                namespace = %capability.namespace,
                operation = op.name,
                "Operation failed: {}",
                e
            ),
            Err(e) => debug!("Operation returned error: {}", e),
        }
        result
    }
}
