//! Lifecycle-event handling shared by every reconciler.
//!
//! `Received -> Dispatched(Create|Update|Delete) -> Discovering -> Persisting
//! -> Reporting-Success`, or `Reporting-Failure` from any step. Every path
//! ends in exactly one report.

pub mod instance_address;
pub mod network_config;
pub mod zone_domain;

use headscale_provision_core::contract::{
    InvocationContext, LifecycleEvent, RequestType, ResourceProperties, ResponseData,
    ResponseDocument, ResponseStatus, DELETE_PHYSICAL_RESOURCE_ID, FAILURE_MESSAGE_ATTRIBUTE,
};
use headscale_provision_core::error::ReconcileError;
use headscale_provision_core::provisioning_graph::ReconcilerKind;
use serde_json::Value;
use tracing::{error, info};

use crate::adapters::callback::CallbackTransport;
use crate::reporter::report;

/// Result of a successful Create/Update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub physical_resource_id: String,
    pub data: ResponseData,
}

pub trait Reconciler {
    fn kind(&self) -> ReconcilerKind;

    /// Discover and persist. Create and Update both land here.
    fn apply(&self, properties: &ResourceProperties) -> Result<Applied, ReconcileError>;

    /// Tear down whatever `apply` persisted, tolerating entries already gone.
    fn remove(&self, properties: &ResourceProperties) -> Result<(), ReconcileError>;
}

/// Parses a raw invocation payload and reconciles it.
///
/// Only an unparseable event (no callback to report to) or a failed report
/// delivery comes back as `Err`.
pub fn handle_raw_event(
    payload: Value,
    context: &InvocationContext,
    reconciler: &dyn Reconciler,
    transport: &dyn CallbackTransport,
) -> Result<ResponseDocument, ReconcileError> {
    let event = LifecycleEvent::from_value(payload)?;
    reconcile(&event, context, reconciler, transport)
}

pub fn reconcile(
    event: &LifecycleEvent,
    context: &InvocationContext,
    reconciler: &dyn Reconciler,
    transport: &dyn CallbackTransport,
) -> Result<ResponseDocument, ReconcileError> {
    info!(
        component = "reconciler",
        event = "reconcile_started",
        reconciler = %reconciler.kind(),
        request_type = %String::from(event.request_type.clone()),
        logical_resource_id = %event.logical_resource_id,
        request_id = %event.request_id,
        invocation_id = %context.aws_request_id,
    );

    match dispatch(event, reconciler) {
        Ok(applied) => report(
            transport,
            event,
            context,
            ResponseStatus::Success,
            applied.data,
            Some(applied.physical_resource_id.as_str()),
            None,
        ),
        Err(failure) => {
            error!(
                component = "reconciler",
                event = "reconcile_failed",
                reconciler = %reconciler.kind(),
                logical_resource_id = %event.logical_resource_id,
                error_kind = failure.kind(),
                error = %failure,
            );
            report_failure(event, context, &failure, transport)
        }
    }
}

/// Sends the FAILED report for `failure`, echoing the orchestrator's physical
/// id when the event carries one.
pub fn report_failure(
    event: &LifecycleEvent,
    context: &InvocationContext,
    failure: &ReconcileError,
    transport: &dyn CallbackTransport,
) -> Result<ResponseDocument, ReconcileError> {
    let message = failure.to_string();
    let physical_resource_id = event
        .physical_resource_id
        .as_deref()
        .unwrap_or(DELETE_PHYSICAL_RESOURCE_ID);
    report(
        transport,
        event,
        context,
        ResponseStatus::Failed,
        ResponseData::from([(FAILURE_MESSAGE_ATTRIBUTE.to_string(), message.clone())]),
        Some(physical_resource_id),
        Some(message.as_str()),
    )
}

fn dispatch(event: &LifecycleEvent, reconciler: &dyn Reconciler) -> Result<Applied, ReconcileError> {
    match &event.request_type {
        RequestType::Create | RequestType::Update => {
            let applied = reconciler.apply(&event.resource_properties)?;
            info!(
                component = "reconciler",
                event = "discovery_completed",
                reconciler = %reconciler.kind(),
                physical_resource_id = %applied.physical_resource_id,
                attributes = ?applied.data,
            );
            Ok(applied)
        }
        RequestType::Delete => {
            reconciler.remove(&event.resource_properties)?;
            Ok(Applied {
                physical_resource_id: DELETE_PHYSICAL_RESOURCE_ID.to_string(),
                data: ResponseData::new(),
            })
        }
        RequestType::Unsupported(other) => Err(ReconcileError::InvalidEvent(format!(
            "unsupported request type: {other}"
        ))),
    }
}
