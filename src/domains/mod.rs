//! Domains module containing business logic organized by bounded contexts.
//!
//! - **tools**: capability model, registry, dispatch and both protocol surfaces
//! - **search**: search providers, key rotation and webpage fetching

pub mod search;
pub mod tools;
