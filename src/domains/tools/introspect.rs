//! Capability introspection.
//!
//! Turns a [`Capability`] type into a [`CapabilityDescriptor`], rejecting
//! shapes that cannot be exposed over REST or MCP.

use std::collections::HashSet;

use tracing::debug;

use super::RegistryError;
use super::capability::{Capability, CapabilityDescriptor};

/// Describe a capability type.
///
/// Pure and deterministic: describing the same type twice yields equal
/// descriptors.
pub fn describe<C: Capability>() -> Result<CapabilityDescriptor, RegistryError> {
    let type_name = std::any::type_name::<C>();

    if std::mem::size_of::<C>() != 0 {
        return Err(RegistryError::invalid_shape(
            type_name,
            "capability types must be zero-sized; operations cannot depend on instance state",
        ));
    }

    let namespace = match C::NAMESPACE {
        Some(ns) => ns.to_string(),
        None => derive_namespace(type_name),
    };
    if !is_identifier(&namespace) {
        return Err(RegistryError::invalid_shape(
            type_name,
            format!("namespace '{}' must match [a-z][a-z0-9_]*", namespace),
        ));
    }

    let operations = C::operations();
    if operations.is_empty() {
        return Err(RegistryError::invalid_shape(
            type_name,
            "capability exposes no operations",
        ));
    }

    let mut seen = HashSet::new();
    for op in &operations {
        if !is_identifier(op.name) {
            return Err(RegistryError::invalid_shape(
                type_name,
                format!("operation name '{}' must match [a-z][a-z0-9_]*", op.name),
            ));
        }
        if !seen.insert(op.name) {
            return Err(RegistryError::invalid_shape(
                type_name,
                format!("operation '{}' is declared twice", op.name),
            ));
        }

        let mut params = HashSet::new();
        for param in &op.parameters {
            if !is_identifier(param.name) || !params.insert(param.name) {
                return Err(RegistryError::invalid_shape(
                    type_name,
                    format!(
                        "operation '{}' has an invalid or duplicate parameter '{}'",
                        op.name, param.name
                    ),
                ));
            }
        }
    }

    debug!(
        namespace = %namespace,
        operations = operations.len(),
        "Described capability {}",
        type_name
    );

    Ok(CapabilityDescriptor {
        namespace,
        description: C::DESCRIPTION,
        type_name,
        operations,
    })
}

/// Derive `<module>_<type>` (lower-cased) from a fully qualified type path.
pub fn derive_namespace(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    let mut segments = base.rsplit("::");
    let ty = segments.next().unwrap_or(base);
    match segments.next() {
        Some(module) => format!("{}_{}", module, ty).to_lowercase(),
        None => ty.to_lowercase(),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::capability::OperationDescriptor;
    use crate::domains::tools::spec::{ParamSpec, TypeSpec};
    use crate::domains::tools::{ToolContext, ToolError};
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct EchoParams {
        text: String,
    }

    async fn echo(_ctx: ToolContext, params: EchoParams) -> Result<String, ToolError> {
        Ok(params.text)
    }

    fn echo_op(name: &'static str) -> OperationDescriptor {
        OperationDescriptor::new(name, "Echo the input", echo)
            .param(ParamSpec::new("text", TypeSpec::String))
            .returns(TypeSpec::String)
    }

    struct Echo;

    impl Capability for Echo {
        const DESCRIPTION: &'static str = "Echo tools";

        fn operations() -> Vec<OperationDescriptor> {
            vec![echo_op("say")]
        }
    }

    struct Named;

    impl Capability for Named {
        const NAMESPACE: Option<&'static str> = Some("loud");
        const DESCRIPTION: &'static str = "Named echo";

        fn operations() -> Vec<OperationDescriptor> {
            vec![echo_op("say"), echo_op("shout")]
        }
    }

    #[allow(dead_code)]
    struct Stateful {
        counter: u32,
    }

    impl Capability for Stateful {
        const DESCRIPTION: &'static str = "Has state";

        fn operations() -> Vec<OperationDescriptor> {
            vec![echo_op("say")]
        }
    }

    struct Empty;

    impl Capability for Empty {
        const NAMESPACE: Option<&'static str> = Some("empty");
        const DESCRIPTION: &'static str = "Nothing";

        fn operations() -> Vec<OperationDescriptor> {
            Vec::new()
        }
    }

    struct Twice;

    impl Capability for Twice {
        const NAMESPACE: Option<&'static str> = Some("twice");
        const DESCRIPTION: &'static str = "Duplicate ops";

        fn operations() -> Vec<OperationDescriptor> {
            vec![echo_op("say"), echo_op("say")]
        }
    }

    struct BadNamespace;

    impl Capability for BadNamespace {
        const NAMESPACE: Option<&'static str> = Some("Bad Namespace");
        const DESCRIPTION: &'static str = "Invalid";

        fn operations() -> Vec<OperationDescriptor> {
            vec![echo_op("say")]
        }
    }

    #[test]
    fn test_derived_namespace() {
        let descriptor = describe::<Echo>().unwrap();
        assert_eq!(descriptor.namespace, "tests_echo");
        assert_eq!(descriptor.operations.len(), 1);
    }

    #[test]
    fn test_explicit_namespace() {
        let descriptor = describe::<Named>().unwrap();
        assert_eq!(descriptor.namespace, "loud");
        assert!(descriptor.operation("shout").is_some());
    }

    #[test]
    fn test_describe_is_idempotent() {
        assert_eq!(describe::<Named>().unwrap(), describe::<Named>().unwrap());
    }

    #[test]
    fn test_stateful_capability_rejected() {
        let err = describe::<Stateful>().unwrap_err();
        assert!(matches!(err, RegistryError::InvalidToolShape { .. }));
    }

    #[test]
    fn test_empty_capability_rejected() {
        assert!(matches!(
            describe::<Empty>(),
            Err(RegistryError::InvalidToolShape { .. })
        ));
    }

    #[test]
    fn test_duplicate_operation_rejected() {
        assert!(matches!(
            describe::<Twice>(),
            Err(RegistryError::InvalidToolShape { .. })
        ));
    }

    #[test]
    fn test_invalid_namespace_rejected() {
        assert!(matches!(
            describe::<BadNamespace>(),
            Err(RegistryError::InvalidToolShape { .. })
        ));
    }

    #[test]
    fn test_derive_namespace_from_path() {
        assert_eq!(
            derive_namespace("tool_hub_server::domains::tools::definitions::calc::Calculator"),
            "calc_calculator"
        );
        assert_eq!(derive_namespace("Calculator"), "calculator");
        assert_eq!(derive_namespace("a::b::Wrapper<c::D>"), "b_wrapper");
    }
}
