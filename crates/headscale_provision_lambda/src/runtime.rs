//! Glue between the Lambda runtime and the reconcilers.

use headscale_provision_core::contract::{InvocationContext, LifecycleEvent, ResponseDocument};
use headscale_provision_core::error::ReconcileError;
use headscale_provision_core::provisioning_graph::ReconcilerKind;
use serde_json::Value;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::adapters::callback::CallbackTransport;
use crate::adapters::inventory::NetworkInventory;
use crate::adapters::parameter_store::ParameterStore;
use crate::adapters::zone_directory::ZoneDirectory;
use crate::config::{ConfigError, RuntimeConfig};
use crate::handlers::instance_address::InstanceAddressReconciler;
use crate::handlers::network_config::NetworkConfigReconciler;
use crate::handlers::zone_domain::ZoneDomainReconciler;
use crate::handlers::{reconcile, report_failure, Reconciler};

/// Provider handles for one invocation.
#[derive(Clone, Copy)]
pub struct ProviderAdapters<'a> {
    pub inventory: &'a dyn NetworkInventory,
    pub zones: &'a dyn ZoneDirectory,
    pub store: &'a dyn ParameterStore,
}

pub fn build_reconciler<'a>(
    kind: ReconcilerKind,
    adapters: ProviderAdapters<'a>,
    default_stack_name: &'a str,
) -> Box<dyn Reconciler + 'a> {
    match kind {
        ReconcilerKind::NetworkConfig => Box::new(NetworkConfigReconciler {
            inventory: adapters.inventory,
            zones: adapters.zones,
            store: adapters.store,
            default_stack_name,
        }),
        ReconcilerKind::InstanceAddress => Box::new(InstanceAddressReconciler {
            inventory: adapters.inventory,
        }),
        ReconcilerKind::ZoneDomain => Box::new(ZoneDomainReconciler {
            zones: adapters.zones,
            store: adapters.store,
            default_stack_name,
        }),
    }
}

/// Reconciles one invocation payload.
///
/// The event is parsed before the configuration is looked at, so a broken
/// `RECONCILER` or `DEFAULT_STACK_NAME` still ends in a FAILED report rather
/// than a stack waiting on a response that never comes.
pub fn handle_invocation(
    payload: Value,
    context: &InvocationContext,
    config: Result<&RuntimeConfig, &ConfigError>,
    adapters: ProviderAdapters<'_>,
    transport: &dyn CallbackTransport,
) -> Result<ResponseDocument, ReconcileError> {
    let event = LifecycleEvent::from_value(payload)?;
    match config {
        Ok(config) => {
            let reconciler =
                build_reconciler(config.reconciler, adapters, &config.default_stack_name);
            reconcile(&event, context, reconciler.as_ref(), transport)
        }
        Err(config_error) => {
            let failure = ReconcileError::Misconfigured(config_error.to_string());
            error!(
                component = "runtime",
                event = "config_invalid",
                logical_resource_id = %event.logical_resource_id,
                error_kind = failure.kind(),
                error = %failure,
            );
            report_failure(&event, context, &failure, transport)
        }
    }
}

pub fn invocation_context(context: &lambda_runtime::Context) -> InvocationContext {
    InvocationContext {
        aws_request_id: context.request_id.clone(),
        log_stream_name: context.env_config.log_stream.clone(),
    }
}

/// JSON lines on stderr; `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_target(false)
        .with_current_span(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
