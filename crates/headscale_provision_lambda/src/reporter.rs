use headscale_provision_core::contract::{
    InvocationContext, LifecycleEvent, ResponseData, ResponseDocument, ResponseStatus,
};
use headscale_provision_core::error::ReconcileError;
use tracing::{error, info};

use crate::adapters::callback::CallbackTransport;

/// Sends exactly one completion document to the event's callback URL.
///
/// A delivery failure is returned as `Transport`; there is no second channel
/// to fall back on.
pub fn report(
    transport: &dyn CallbackTransport,
    event: &LifecycleEvent,
    context: &InvocationContext,
    status: ResponseStatus,
    data: ResponseData,
    physical_resource_id: Option<&str>,
    reason: Option<&str>,
) -> Result<ResponseDocument, ReconcileError> {
    let document = ResponseDocument::new(event, context, status, data, physical_resource_id, reason);
    let body = document.to_json_bytes()?;

    match transport.put(&event.response_url, &body) {
        Ok(()) => {
            info!(
                component = "response_reporter",
                event = "report_sent",
                status = ?document.status,
                physical_resource_id = %document.physical_resource_id,
                logical_resource_id = %document.logical_resource_id,
                body_bytes = body.len(),
            );
            Ok(document)
        }
        Err(delivery_error) => {
            error!(
                component = "response_reporter",
                event = "report_failed",
                logical_resource_id = %document.logical_resource_id,
                error = %delivery_error,
            );
            Err(match delivery_error {
                ReconcileError::Transport(_) => delivery_error,
                other => ReconcileError::transport(other.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::test_helpers::RecordingTransport;

    use super::*;

    fn sample_event() -> LifecycleEvent {
        LifecycleEvent::from_value(json!({
            "RequestType": "Delete",
            "ResponseURL": "https://cfn-responses.example/signed",
            "StackId": "stack-1",
            "RequestId": "req-9",
            "LogicalResourceId": "NetworkConfigResource",
            "PhysicalResourceId": "vpc-0abc"
        }))
        .expect("event should parse")
    }

    fn sample_context() -> InvocationContext {
        InvocationContext {
            aws_request_id: "inv-1".to_string(),
            log_stream_name: "stream-1".to_string(),
        }
    }

    #[test]
    fn puts_document_to_callback_url() {
        let transport = RecordingTransport::new();
        let document = report(
            &transport,
            &sample_event(),
            &sample_context(),
            ResponseStatus::Success,
            ResponseData::new(),
            Some("CustomResourcePhysicalID"),
            None,
        )
        .expect("report should be delivered");

        assert_eq!(transport.urls(), vec!["https://cfn-responses.example/signed"]);
        assert_eq!(transport.documents(), vec![document.clone()]);
        assert_eq!(document.request_id, "req-9");
        assert_eq!(document.logical_resource_id, "NetworkConfigResource");
        assert!(!document.no_echo);
    }

    #[test]
    fn delivery_failure_is_a_transport_error() {
        let transport = RecordingTransport::failing();
        let error = report(
            &transport,
            &sample_event(),
            &sample_context(),
            ResponseStatus::Failed,
            ResponseData::new(),
            None,
            Some("boom"),
        )
        .expect_err("delivery should fail");

        assert!(matches!(error, ReconcileError::Transport(_)));
        assert_eq!(transport.urls().len(), 1);
    }
}
