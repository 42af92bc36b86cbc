//! Shared provisioning domain primitives.
//!
//! This crate owns the custom-resource request/response contract, the
//! stack-scoped configuration paths, the reconciliation error taxonomy, and
//! the dependency graph that sequences the reconciliation steps. It
//! intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod config_paths;
pub mod contract;
pub mod error;
pub mod provisioning_graph;
