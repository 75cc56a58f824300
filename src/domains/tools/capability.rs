//! Capability definitions.
//!
//! A capability is a zero-sized type grouping stateless operations under a
//! namespace. Each operation carries its parameter list, its result shape,
//! and a type-erased handler that deserializes arguments into a typed
//! parameter struct before running.

use std::{fmt, future::Future, sync::Arc};

use futures::{FutureExt, future::BoxFuture};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::ToolError;
use super::spec::{ParamSpec, TypeSpec};
use crate::core::Config;
use crate::domains::search::{SearchProviderRegistry, WebpageFetcher};

/// Shared services available to every operation.
///
/// Holds no per-request state; cloning is cheap.
#[derive(Clone)]
pub struct ToolContext {
    pub config: Arc<Config>,
    pub search: Arc<SearchProviderRegistry>,
    pub fetcher: WebpageFetcher,
}

impl ToolContext {
    /// Build the context from a frozen configuration.
    pub fn new(config: Arc<Config>) -> Self {
        let fetcher = WebpageFetcher::new(&config.fetch);
        let search = Arc::new(SearchProviderRegistry::from_config(
            &config.search,
            fetcher.clone(),
        ));
        Self {
            config,
            search,
            fetcher,
        }
    }
}

/// Result of running an operation handler.
pub type OperationFuture = BoxFuture<'static, Result<Value, ToolError>>;

/// Type-erased operation handler.
pub type OperationHandler = Arc<dyn Fn(ToolContext, Value) -> OperationFuture + Send + Sync>;

/// A single invocable operation of a capability.
#[derive(Clone)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParamSpec>,
    pub returns: TypeSpec,
    handler: OperationHandler,
}

impl OperationDescriptor {
    /// Create an operation from a typed handler.
    ///
    /// Arguments are deserialized into `P`; a deserialization failure is
    /// reported as [`ToolError::InvalidRequest`]. The handler's output is
    /// serialized back to JSON.
    pub fn new<P, R, F, Fut>(name: &'static str, description: &'static str, f: F) -> Self
    where
        P: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(ToolContext, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ToolError>> + Send + 'static,
    {
        let handler: OperationHandler =
            Arc::new(move |ctx: ToolContext, arguments: Value| -> OperationFuture {
                let params = match serde_json::from_value::<P>(arguments) {
                    Ok(params) => params,
                    Err(e) => {
                        return futures::future::ready(Err(ToolError::invalid_request(
                            e.to_string(),
                        )))
                        .boxed();
                    }
                };
                let fut = f(ctx, params);
                async move {
                    let output = fut.await?;
                    serde_json::to_value(output).map_err(|e| {
                        ToolError::internal(format!("Failed to serialize result: {}", e))
                    })
                }
                .boxed()
            });

        Self {
            name,
            description,
            parameters: Vec::new(),
            returns: TypeSpec::Any,
            handler,
        }
    }

    /// Append a parameter.
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Declare the result shape.
    pub fn returns(mut self, returns: TypeSpec) -> Self {
        self.returns = returns;
        self
    }

    /// Run the handler with already-validated arguments.
    pub fn invoke(&self, ctx: ToolContext, arguments: Value) -> OperationFuture {
        (self.handler)(ctx, arguments)
    }
}

impl fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// Descriptors compare by signature; handler identity is not part of equality.
impl PartialEq for OperationDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.parameters == other.parameters
            && self.returns == other.returns
    }
}

/// A group of stateless operations exposed under one namespace.
///
/// Implementors must be zero-sized; capabilities carrying instance state
/// are rejected at registration.
pub trait Capability: 'static {
    /// Explicit namespace. Derived from the type path when `None`.
    const NAMESPACE: Option<&'static str> = None;

    /// Short summary used as the OpenAPI tag description.
    const DESCRIPTION: &'static str;

    /// The operations this capability exposes.
    fn operations() -> Vec<OperationDescriptor>;
}

/// Structural description of a registered capability.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityDescriptor {
    pub namespace: String,
    pub description: &'static str,
    pub type_name: &'static str,
    pub operations: Vec<OperationDescriptor>,
}

impl CapabilityDescriptor {
    /// Find an operation by name.
    pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations.iter().find(|op| op.name == name)
    }
}

/// MCP tool name for an operation: `<namespace>_<operation>`.
pub fn tool_name(namespace: &str, operation: &str) -> String {
    format!("{}_{}", namespace, operation)
}

/// REST path for an operation: `/<namespace>/<operation>`.
pub fn route_path(namespace: &str, operation: &str) -> String {
    format!("/{}/{}", namespace, operation)
}
