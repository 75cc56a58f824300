//! Tools domain module.
//!
//! Capabilities are described once and exposed through both protocol
//! surfaces from the same descriptors.
//!
//! ## Architecture
//!
//! - `capability.rs` - Capability trait, operation and capability descriptors
//! - `spec.rs` - Parameter and result shapes, JSON schema, argument validation
//! - `introspect.rs` - Turns a capability type into a checked descriptor
//! - `registry.rs` - Frozen set of descriptors with a tool-name index
//! - `dispatch.rs` - Auth gate, validation and panic containment for every call
//! - `routes.rs` / `openapi.rs` - REST surface and its OpenAPI document
//! - `router.rs` - rmcp ToolRouter for the MCP surface
//! - `definitions/` - Concrete capabilities, one file each
//!
//! ## Adding a New Capability
//!
//! 1. Create a file in `definitions/` with a zero-sized type implementing
//!    [`Capability`]
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it in [`CapabilityRegistry::with_default_capabilities`]
//!
//! Routes, MCP tools and the OpenAPI document pick it up from the registry.

pub mod capability;
pub mod definitions;
pub mod dispatch;
mod error;
pub mod introspect;
pub mod openapi;
pub mod registry;
pub mod router;
pub mod routes;
pub mod spec;

pub use capability::{
    Capability, CapabilityDescriptor, OperationDescriptor, ToolContext, route_path, tool_name,
};
pub use dispatch::Dispatcher;
pub use error::{RegistryError, ToolError};
pub use introspect::describe;
pub use registry::CapabilityRegistry;
pub use router::build_tool_router;
pub use routes::{ApiError, RouteSpec, RouteSynthesizer};
pub use spec::{ParamSpec, TypeSpec};
