//! Capability definitions.
//!
//! Each capability lives in its own file and is registered by
//! [`CapabilityRegistry::with_default_capabilities`](super::CapabilityRegistry::with_default_capabilities).

pub mod calc;
pub mod datetime;
pub mod fetch;
pub mod file;
pub mod think;
pub mod todo;
pub mod websearch;

pub use calc::Calculator;
pub use datetime::DateTimeTool;
pub use fetch::FetchTool;
pub use file::FileTool;
pub use think::ThinkTool;
pub use todo::TodoListTool;
pub use websearch::WebSearchTool;
