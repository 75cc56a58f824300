//! Tool Router - builds the rmcp ToolRouter from the capability registry.
//!
//! One route per operation, named `<namespace>_<operation>`, each calling
//! through the same [`Dispatcher`] the REST surface uses.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
    model::{CallToolResult, Content, ErrorCode, Tool},
};
use serde_json::Value;
use tracing::warn;

use super::ToolError;
use super::capability::{CapabilityDescriptor, OperationDescriptor, tool_name};
use super::dispatch::Dispatcher;
use super::spec::object_schema;

/// JSON-RPC error code for a rejected credential.
pub const UNAUTHORIZED_CODE: i32 = -32001;

/// Build the tool router for every registered operation.
pub fn build_tool_router<S>(dispatcher: Dispatcher) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    let tools: Vec<Tool> = dispatcher
        .registry()
        .operations()
        .map(|(capability, op)| to_tool(capability, op))
        .collect();

    tools.into_iter().fold(ToolRouter::new(), |router, tool| {
        router.with_route(create_route(tool, dispatcher.clone()))
    })
}

/// MCP tool model for an operation.
pub fn to_tool(capability: &CapabilityDescriptor, op: &OperationDescriptor) -> Tool {
    Tool {
        name: tool_name(&capability.namespace, op.name).into(),
        title: None,
        description: Some(op.description.into()),
        input_schema: Arc::new(object_schema(&op.parameters)),
        output_schema: None,
        annotations: None,
        icons: None,
        meta: None,
    }
}

fn create_route<S>(tool: Tool, dispatcher: Dispatcher) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
{
    let name = tool.name.to_string();
    ToolRoute::new_dyn(tool, move |ctx: ToolCallContext<'_, S>| {
        let args = ctx.arguments.clone().unwrap_or_default();
        let dispatcher = dispatcher.clone();
        let name = name.clone();
        async move {
            // stdio carries no credential channel.
            let result = dispatcher
                .invoke_tool(None, &name, Value::Object(args))
                .await;
            into_call_tool_result(result)
        }
        .boxed()
    })
}

/// Map a dispatch outcome onto MCP.
///
/// Protocol-level problems become JSON-RPC errors. Failures of the tool
/// itself become a successful response with `isError: true` so the model
/// can read the message.
pub fn into_call_tool_result(result: Result<Value, ToolError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => Ok(CallToolResult {
            content: vec![Content::text(value.to_string())],
            structured_content: Some(value),
            is_error: Some(false),
            meta: None,
        }),
        Err(e @ (ToolError::InvalidRequest(_) | ToolError::NotFound(_))) => {
            Err(McpError::invalid_params(e.to_string(), None))
        }
        Err(e @ ToolError::Unauthorized(_)) => Err(McpError::new(
            ErrorCode(UNAUTHORIZED_CODE),
            e.to_string(),
            None,
        )),
        Err(e @ ToolError::Internal(_)) => Err(McpError::internal_error(e.public_message(), None)),
        Err(e) => {
            warn!("Tool call failed: {}", e);
            Ok(CallToolResult::error(vec![Content::text(e.public_message())]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AuthConfig, Config};
    use crate::core::security::{AuthError, AuthGate};
    use crate::domains::tools::{CapabilityRegistry, ToolContext};
    use serde_json::json;

    struct TestServer {}

    fn dispatcher() -> Dispatcher {
        let registry = CapabilityRegistry::with_default_capabilities()
            .unwrap()
            .freeze();
        Dispatcher::new(
            registry,
            Arc::new(AuthGate::new(&AuthConfig::default())),
            ToolContext::new(Arc::new(Config::default())),
        )
    }

    #[test]
    fn test_router_matches_registry() {
        let dispatcher = dispatcher();
        let router: ToolRouter<TestServer> = build_tool_router(dispatcher.clone());
        let tools = router.list_all();
        let names: Vec<_> = tools.iter().map(|t| t.name.to_string()).collect();

        let expected = dispatcher.registry().tool_names();
        assert_eq!(names.len(), expected.len());
        for name in expected {
            assert!(names.contains(&name), "missing tool {}", name);
        }
    }

    #[test]
    fn test_input_schema_comes_from_params() {
        let dispatcher = dispatcher();
        let (capability, op) = dispatcher.registry().lookup_tool("calc_evaluate").unwrap();
        let tool = to_tool(capability, op);
        assert_eq!(tool.input_schema.get("type"), Some(&json!("object")));
        assert_eq!(tool.input_schema.get("required"), Some(&json!(["expression"])));
    }

    #[test]
    fn test_error_mapping() {
        let ok = into_call_tool_result(Ok(json!({ "result": 8 }))).unwrap();
        assert_eq!(ok.is_error, Some(false));
        assert_eq!(ok.structured_content, Some(json!({ "result": 8 })));

        let err = into_call_tool_result(Err(ToolError::invalid_request("bad"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

        let err = into_call_tool_result(Err(AuthError::MissingCredential.into())).unwrap_err();
        assert_eq!(err.code, ErrorCode(UNAUTHORIZED_CODE));

        let failed =
            into_call_tool_result(Err(ToolError::execution_failed("disk on fire"))).unwrap();
        assert_eq!(failed.is_error, Some(true));
    }
}
