use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config_paths::validate_stack_name;
use crate::error::ReconcileError;

pub const DEFAULT_STACK_NAME: &str = "headscale";
pub const DELETE_PHYSICAL_RESOURCE_ID: &str = "CustomResourcePhysicalID";

pub const STACK_NAME_PROPERTY: &str = "StackName";
pub const HOSTED_ZONE_ID_PROPERTY: &str = "HostedZoneId";
pub const INSTANCE_ID_PROPERTY: &str = "InstanceId";

pub const IPV6_CIDR_BLOCK_ATTRIBUTE: &str = "Ipv6CidrBlock";
pub const DOMAIN_NAME_ATTRIBUTE: &str = "DomainName";
pub const IPV6_ADDRESS_ATTRIBUTE: &str = "Ipv6Address";
pub const FAILURE_MESSAGE_ATTRIBUTE: &str = "Message";

pub type ResponseData = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestType {
    Create,
    Update,
    Delete,
    Unsupported(String),
}

impl From<String> for RequestType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Create" => Self::Create,
            "Update" => Self::Update,
            "Delete" => Self::Delete,
            _ => Self::Unsupported(value),
        }
    }
}

impl From<RequestType> for String {
    fn from(value: RequestType) -> Self {
        match value {
            RequestType::Create => "Create".to_string(),
            RequestType::Update => "Update".to_string(),
            RequestType::Delete => "Delete".to_string(),
            RequestType::Unsupported(other) => other,
        }
    }
}

/// Properties copied by the orchestrator from the custom resource declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceProperties(BTreeMap<String, Value>);

impl ResourceProperties {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key.to_string(), Value::from(value)))
                .collect(),
        )
    }

    /// String value for `key`; blank strings count as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn require_str(&self, key: &str) -> Result<&str, ReconcileError> {
        self.get_str(key)
            .ok_or_else(|| ReconcileError::MissingProperty(key.to_string()))
    }

    pub fn stack_name_or<'a>(&'a self, default: &'a str) -> Result<&'a str, ReconcileError> {
        let stack_name = self.get_str(STACK_NAME_PROPERTY).unwrap_or(default);
        validate_stack_name(stack_name)?;
        Ok(stack_name)
    }
}

/// One Create/Update/Delete notification from the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub resource_properties: ResourceProperties,
}

impl LifecycleEvent {
    pub fn from_value(value: Value) -> Result<Self, ReconcileError> {
        serde_json::from_value(value).map_err(|error| ReconcileError::InvalidEvent(error.to_string()))
    }
}

/// Execution details of the function invocation handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub aws_request_id: String,
    pub log_stream_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// The document PUT to the event's callback URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseDocument {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: ResponseData,
}

impl ResponseDocument {
    /// Builds the response for `event`.
    ///
    /// `reason` defaults to a pointer at the invocation's log stream, and
    /// `physical_resource_id` defaults to the log stream name.
    pub fn new(
        event: &LifecycleEvent,
        context: &InvocationContext,
        status: ResponseStatus,
        data: ResponseData,
        physical_resource_id: Option<&str>,
        reason: Option<&str>,
    ) -> Self {
        let reason = reason.map(str::to_string).unwrap_or_else(|| {
            format!(
                "See the details in CloudWatch Log Stream: {}",
                context.log_stream_name
            )
        });
        Self {
            status,
            reason,
            physical_resource_id: physical_resource_id
                .unwrap_or(&context.log_stream_name)
                .to_string(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data,
        }
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ReconcileError> {
        serde_json::to_vec(self)
            .map_err(|error| ReconcileError::InvalidEvent(format!("unserializable response: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_event() -> LifecycleEvent {
        LifecycleEvent::from_value(json!({
            "RequestType": "Create",
            "ResponseURL": "https://callback.example/signed?sig=abc",
            "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/headscale/guid",
            "RequestId": "req-1",
            "LogicalResourceId": "TriggerLambdaCustomResource",
            "ResourceType": "Custom::Ipv6Cidr",
            "ResourceProperties": {
                "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:ipv6",
                "HostedZoneId": "Z123",
                "StackName": ""
            }
        }))
        .expect("event should parse")
    }

    fn sample_context() -> InvocationContext {
        InvocationContext {
            aws_request_id: "invocation-1".to_string(),
            log_stream_name: "2026/10/16/[$LATEST]abcdef".to_string(),
        }
    }

    #[test]
    fn parses_orchestrator_event_shape() {
        let event = sample_event();
        assert_eq!(event.request_type, RequestType::Create);
        assert_eq!(event.physical_resource_id, None);
        assert_eq!(
            event.resource_properties.get_str(HOSTED_ZONE_ID_PROPERTY),
            Some("Z123")
        );
    }

    #[test]
    fn blank_stack_name_falls_back_to_default() {
        let event = sample_event();
        let stack_name = event
            .resource_properties
            .stack_name_or(DEFAULT_STACK_NAME)
            .expect("default stack name is valid");
        assert_eq!(stack_name, "headscale");
    }

    #[test]
    fn missing_property_names_the_key() {
        let event = sample_event();
        let error = event
            .resource_properties
            .require_str(INSTANCE_ID_PROPERTY)
            .expect_err("InstanceId is absent");
        assert_eq!(error, ReconcileError::MissingProperty("InstanceId".to_string()));
    }

    #[test]
    fn unknown_request_type_is_preserved() {
        let parsed: RequestType =
            serde_json::from_value(json!("Rollback")).expect("any string parses");
        assert_eq!(parsed, RequestType::Unsupported("Rollback".to_string()));
    }

    #[test]
    fn response_document_uses_bit_exact_field_names() {
        let document = ResponseDocument::new(
            &sample_event(),
            &sample_context(),
            ResponseStatus::Success,
            ResponseData::from([(
                IPV6_CIDR_BLOCK_ATTRIBUTE.to_string(),
                "2600:1f18:abcd::/56".to_string(),
            )]),
            Some("vpc-0abc"),
            None,
        );

        let value = serde_json::to_value(&document).expect("document should serialize");
        assert_eq!(
            value,
            json!({
                "Status": "SUCCESS",
                "Reason": "See the details in CloudWatch Log Stream: 2026/10/16/[$LATEST]abcdef",
                "PhysicalResourceId": "vpc-0abc",
                "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/headscale/guid",
                "RequestId": "req-1",
                "LogicalResourceId": "TriggerLambdaCustomResource",
                "NoEcho": false,
                "Data": {"Ipv6CidrBlock": "2600:1f18:abcd::/56"}
            })
        );
    }

    #[test]
    fn physical_id_defaults_to_log_stream() {
        let document = ResponseDocument::new(
            &sample_event(),
            &sample_context(),
            ResponseStatus::Failed,
            ResponseData::new(),
            None,
            Some("No VPC found"),
        );
        assert_eq!(document.physical_resource_id, "2026/10/16/[$LATEST]abcdef");
        assert_eq!(document.reason, "No VPC found");
    }
}
