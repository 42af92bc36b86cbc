//! In-memory provider adapters and canned events shared by unit and
//! integration tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use headscale_provision_core::contract::{InvocationContext, ResponseDocument};
use headscale_provision_core::error::ReconcileError;
use serde_json::{json, Value};

use crate::adapters::callback::CallbackTransport;
use crate::adapters::inventory::{
    InstanceRecord, Ipv6CidrAssociation, NetworkInterfaceRecord, NetworkInventory, VpcRecord,
};
use crate::adapters::parameter_store::{DeleteOutcome, ParameterStore};
use crate::adapters::zone_directory::ZoneDirectory;

#[derive(Default)]
pub struct StaticInventory {
    pub vpcs: BTreeMap<String, Vec<VpcRecord>>,
    pub instances: BTreeMap<String, InstanceRecord>,
    pub failure: Option<ReconcileError>,
}

impl StaticInventory {
    pub fn with_vpc(name: &str, vpc_id: &str, cidr_blocks: &[&str]) -> Self {
        let mut inventory = Self::default();
        inventory.vpcs.insert(
            name.to_string(),
            vec![VpcRecord {
                vpc_id: Some(vpc_id.to_string()),
                ipv6_cidr_associations: cidr_blocks
                    .iter()
                    .map(|block| Ipv6CidrAssociation {
                        ipv6_cidr_block: Some(block.to_string()),
                        state: Some("associated".to_string()),
                    })
                    .collect(),
            }],
        );
        inventory
    }

    pub fn with_instance(instance_id: &str, addresses: &[&str]) -> Self {
        let mut inventory = Self::default();
        inventory.instances.insert(
            instance_id.to_string(),
            InstanceRecord {
                instance_id: instance_id.to_string(),
                network_interfaces: vec![NetworkInterfaceRecord {
                    device_index: Some(0),
                    ipv6_addresses: addresses.iter().map(|a| a.to_string()).collect(),
                }],
            },
        );
        inventory
    }

    /// Every lookup fails with `error`.
    pub fn failing(error: ReconcileError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }
}

impl NetworkInventory for StaticInventory {
    fn vpcs_tagged_name(&self, name: &str) -> Result<Vec<VpcRecord>, ReconcileError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self.vpcs.get(name).cloned().unwrap_or_default())
    }

    fn instance(&self, instance_id: &str) -> Result<Option<InstanceRecord>, ReconcileError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self.instances.get(instance_id).cloned())
    }
}

#[derive(Default)]
pub struct StaticZones {
    pub zones: BTreeMap<String, String>,
}

impl StaticZones {
    pub fn with_zone(zone_id: &str, name: &str) -> Self {
        Self {
            zones: BTreeMap::from([(zone_id.to_string(), name.to_string())]),
        }
    }

    pub fn and_zone(mut self, zone_id: &str, name: &str) -> Self {
        self.zones.insert(zone_id.to_string(), name.to_string());
        self
    }
}

impl ZoneDirectory for StaticZones {
    fn hosted_zone_name(&self, zone_id: &str) -> Result<Option<String>, ReconcileError> {
        Ok(self.zones.get(zone_id).cloned())
    }
}

#[derive(Default)]
pub struct RecordingStore {
    values: Mutex<BTreeMap<String, String>>,
    puts: Mutex<Vec<String>>,
    denied_prefix: Option<&'static str>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denying(prefix: &'static str) -> Self {
        Self {
            denied_prefix: Some(prefix),
            ..Self::default()
        }
    }

    pub fn seed(&self, name: &str, value: &str) {
        self.values
            .lock()
            .expect("poisoned mutex")
            .insert(name.to_string(), value.to_string());
    }

    pub fn values(&self) -> BTreeMap<String, String> {
        self.values.lock().expect("poisoned mutex").clone()
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().expect("poisoned mutex").len()
    }
}

impl ParameterStore for RecordingStore {
    fn put_parameter(&self, name: &str, value: &str) -> Result<(), ReconcileError> {
        if self
            .denied_prefix
            .map(|prefix| name.starts_with(prefix))
            .unwrap_or(false)
        {
            return Err(ReconcileError::provider_api(format!(
                "simulated put failure for {name}"
            )));
        }
        self.puts
            .lock()
            .expect("poisoned mutex")
            .push(name.to_string());
        self.values
            .lock()
            .expect("poisoned mutex")
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn delete_parameter(&self, name: &str) -> Result<DeleteOutcome, ReconcileError> {
        let removed = self.values.lock().expect("poisoned mutex").remove(name);
        Ok(match removed {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::AlreadyAbsent,
        })
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<(String, Vec<u8>)>>,
    fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn documents(&self) -> Vec<ResponseDocument> {
        self.requests
            .lock()
            .expect("poisoned mutex")
            .iter()
            .map(|(_, body)| serde_json::from_slice(body).expect("response should parse"))
            .collect()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("poisoned mutex")
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }
}

impl CallbackTransport for RecordingTransport {
    fn put(&self, url: &str, body: &[u8]) -> Result<(), ReconcileError> {
        self.requests
            .lock()
            .expect("poisoned mutex")
            .push((url.to_string(), body.to_vec()));
        if self.fail {
            return Err(ReconcileError::transport("connection refused"));
        }
        Ok(())
    }
}

pub fn lifecycle_event(request_type: &str, properties: Value) -> Value {
    json!({
        "RequestType": request_type,
        "ResponseURL": "https://cloudformation-custom-resource-response.example/signed?X-Amz-Signature=abc",
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/headscale/1a2b",
        "RequestId": "6f1c2d6e-request",
        "LogicalResourceId": "NetworkConfigResource",
        "ResourceType": "Custom::DiscoveredAttribute",
        "ResourceProperties": properties
    })
}

pub fn invocation() -> InvocationContext {
    InvocationContext {
        aws_request_id: "c0ffee-invocation".to_string(),
        log_stream_name: "2026/10/16/[$LATEST]0123456789abcdef".to_string(),
    }
}
