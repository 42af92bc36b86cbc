//! AWS-oriented adapters and handlers for the provisioning custom resources.
//!
//! This crate owns runtime integration details (the Lambda entrypoint,
//! provider clients, and the callback transport) and the reconcilers that
//! run during stack Create/Update/Delete. Contracts, configuration paths, and
//! the dependency graph live in `headscale_provision_core`.

pub mod adapters;
pub mod config;
pub mod config_store;
pub mod domain;
pub mod handlers;
pub mod lookup;
pub mod reporter;
pub mod runtime;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
