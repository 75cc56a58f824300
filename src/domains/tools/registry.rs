//! Capability Registry - the set of capabilities exposed by this process.
//!
//! The registry is populated once at startup, then frozen behind an `Arc`
//! and shared read-only with every transport. Lookups never take a lock.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::config::Config;

use super::RegistryError;
use super::capability::{
    Capability, CapabilityDescriptor, OperationDescriptor, route_path, tool_name,
};
use super::definitions::{
    Calculator, DateTimeTool, FetchTool, FileTool, ThinkTool, TodoListTool, WebSearchTool,
};
use super::introspect::describe;

// ============================================================================
// Capability Registry
// ============================================================================

/// Ordered collection of capability descriptors with a tool-name index.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    capabilities: Vec<CapabilityDescriptor>,
    /// MCP tool name -> (capability index, operation index).
    tools: HashMap<String, (usize, usize)>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in capabilities that touch no local files.
    pub fn with_default_capabilities() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register_capability::<Calculator>()?;
        registry.register_capability::<DateTimeTool>()?;
        registry.register_capability::<WebSearchTool>()?;
        registry.register_capability::<FetchTool>()?;
        registry.register_capability::<ThinkTool>()?;
        registry.register_capability::<TodoListTool>()?;
        Ok(registry)
    }

    /// Built-in capabilities for a configuration.
    ///
    /// The file capability is only exposed when a root directory confines it.
    pub fn for_config(config: &Config) -> Result<Self, RegistryError> {
        let mut registry = Self::with_default_capabilities()?;
        match &config.security.root_path {
            Some(root) => {
                registry.register_capability::<FileTool>()?;
                info!(root = %root.display(), "File capability enabled");
            }
            None => warn!("TOOLHUB_ROOT_PATH not set - file capability disabled"),
        }
        Ok(registry)
    }

    /// Describe and register a capability type.
    pub fn register_capability<C: Capability>(&mut self) -> Result<(), RegistryError> {
        self.register(describe::<C>()?)
    }

    /// Register a descriptor.
    ///
    /// Fails without modifying the registry when the namespace or any
    /// derived tool name is already taken.
    pub fn register(&mut self, descriptor: CapabilityDescriptor) -> Result<(), RegistryError> {
        if self
            .capabilities
            .iter()
            .any(|c| c.namespace == descriptor.namespace)
        {
            return Err(RegistryError::DuplicateNamespace(descriptor.namespace));
        }

        let index = self.capabilities.len();
        let mut entries = Vec::with_capacity(descriptor.operations.len());
        for (op_index, op) in descriptor.operations.iter().enumerate() {
            let name = tool_name(&descriptor.namespace, op.name);
            if self.tools.contains_key(&name) {
                return Err(RegistryError::DuplicateToolName(name));
            }
            entries.push((name, (index, op_index)));
        }

        info!(
            namespace = %descriptor.namespace,
            operations = descriptor.operations.len(),
            "Registered capability"
        );
        self.tools.extend(entries);
        self.capabilities.push(descriptor);
        Ok(())
    }

    /// Freeze the registry for shared read-only use.
    pub fn freeze(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// All descriptors in registration order.
    pub fn all(&self) -> &[CapabilityDescriptor] {
        &self.capabilities
    }

    /// Number of registered capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Iterate over every operation, in registration order.
    pub fn operations(
        &self,
    ) -> impl Iterator<Item = (&CapabilityDescriptor, &OperationDescriptor)> {
        self.capabilities
            .iter()
            .flat_map(|c| c.operations.iter().map(move |op| (c, op)))
    }

    /// Look up an operation by namespace and name.
    pub fn lookup(
        &self,
        namespace: &str,
        operation: &str,
    ) -> Option<(&CapabilityDescriptor, &OperationDescriptor)> {
        let capability = self.capabilities.iter().find(|c| c.namespace == namespace)?;
        let op = capability.operation(operation)?;
        Some((capability, op))
    }

    /// Look up an operation by its MCP tool name.
    pub fn lookup_tool(
        &self,
        name: &str,
    ) -> Option<(&CapabilityDescriptor, &OperationDescriptor)> {
        let (c, o) = *self.tools.get(name)?;
        let capability = self.capabilities.get(c)?;
        Some((capability, capability.operations.get(o)?))
    }

    /// All MCP tool names, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.operations()
            .map(|(c, op)| tool_name(&c.namespace, op.name))
            .collect()
    }

    /// All REST paths, in registration order.
    pub fn route_paths(&self) -> Vec<String> {
        self.operations()
            .map(|(c, op)| route_path(&c.namespace, op.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::{ToolContext, ToolError};

    struct Alpha;

    impl Capability for Alpha {
        const NAMESPACE: Option<&'static str> = Some("a_b");
        const DESCRIPTION: &'static str = "Alpha";

        fn operations() -> Vec<OperationDescriptor> {
            vec![OperationDescriptor::new(
                "c",
                "op",
                |_ctx: ToolContext, _params: serde_json::Value| async {
                    Ok::<_, ToolError>(serde_json::Value::Null)
                },
            )]
        }
    }

    struct Beta;

    impl Capability for Beta {
        const NAMESPACE: Option<&'static str> = Some("a");
        const DESCRIPTION: &'static str = "Beta";

        fn operations() -> Vec<OperationDescriptor> {
            vec![OperationDescriptor::new(
                "b_c",
                "op",
                |_ctx: ToolContext, _params: serde_json::Value| async {
                    Ok::<_, ToolError>(serde_json::Value::Null)
                },
            )]
        }
    }

    #[test]
    fn test_default_capabilities() {
        let registry = CapabilityRegistry::with_default_capabilities().unwrap();
        let names = registry.tool_names();
        assert!(names.contains(&"calc_evaluate".to_string()));
        assert!(names.contains(&"time_now".to_string()));
        assert!(names.contains(&"time_convert".to_string()));
        assert!(names.contains(&"web_search_searxng".to_string()));
        assert!(names.contains(&"fetch_webpage".to_string()));
        assert!(names.contains(&"todo_write".to_string()));

        let paths = registry.route_paths();
        assert!(paths.contains(&"/calc/evaluate".to_string()));
        assert!(paths.contains(&"/fetch/webpage".to_string()));
    }

    #[test]
    fn test_file_capability_requires_root() {
        let mut config = Config::default();
        let registry = CapabilityRegistry::for_config(&config).unwrap();
        assert!(registry.lookup_tool("file_write").is_none());
        assert!(!registry.route_paths().iter().any(|p| p.starts_with("/file/")));

        config.security.root_path = Some(std::env::temp_dir());
        let registry = CapabilityRegistry::for_config(&config).unwrap();
        assert!(registry.lookup_tool("file_read").is_some());
        assert!(registry.lookup_tool("file_write").is_some());
        assert!(registry.lookup_tool("file_list").is_some());
    }

    #[test]
    fn test_duplicate_namespace_rejected() {
        let mut registry = CapabilityRegistry::new();
        registry.register_capability::<Alpha>().unwrap();
        let err = registry.register_capability::<Alpha>().unwrap_err();
        assert_eq!(err, RegistryError::DuplicateNamespace("a_b".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_colliding_tool_names_rejected() {
        let mut registry = CapabilityRegistry::new();
        registry.register_capability::<Alpha>().unwrap();
        let err = registry.register_capability::<Beta>().unwrap_err();
        assert_eq!(err, RegistryError::DuplicateToolName("a_b_c".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_by_route_and_tool_name() {
        let registry = CapabilityRegistry::with_default_capabilities().unwrap();
        let (cap, op) = registry.lookup("calc", "evaluate").unwrap();
        assert_eq!(cap.namespace, "calc");
        assert_eq!(op.name, "evaluate");

        let (_, by_tool) = registry.lookup_tool("calc_evaluate").unwrap();
        assert_eq!(by_tool, op);
        assert!(registry.lookup("calc", "missing").is_none());
        assert!(registry.lookup_tool("missing_tool").is_none());
    }
}
