//! Provider adapters backed by the AWS SDK.
//!
//! The adapter traits are synchronous, so each call parks the current worker
//! with `block_in_place` and drives the SDK future on the ambient runtime.

use std::future::Future;

use aws_sdk_ec2::error::ProvideErrorMetadata;
use aws_sdk_ec2::types::Filter;
use aws_sdk_ssm::types::ParameterType;
use headscale_provision_core::error::ReconcileError;

use crate::adapters::inventory::{
    InstanceRecord, Ipv6CidrAssociation, NetworkInterfaceRecord, NetworkInventory, VpcRecord,
};
use crate::adapters::parameter_store::{DeleteOutcome, ParameterStore};
use crate::adapters::zone_directory::ZoneDirectory;

const INSTANCE_NOT_FOUND_CODE: &str = "InvalidInstanceID.NotFound";

/// One client per provider service, built once per invocation.
#[derive(Clone)]
pub struct ProviderClients {
    pub ec2: aws_sdk_ec2::Client,
    pub ssm: aws_sdk_ssm::Client,
    pub route53: aws_sdk_route53::Client,
}

impl ProviderClients {
    pub fn from_conf(aws_config: &aws_config::SdkConfig) -> Self {
        Self {
            ec2: aws_sdk_ec2::Client::new(aws_config),
            ssm: aws_sdk_ssm::Client::new(aws_config),
            route53: aws_sdk_route53::Client::new(aws_config),
        }
    }

    pub fn inventory(&self) -> Ec2NetworkInventory {
        Ec2NetworkInventory {
            client: self.ec2.clone(),
        }
    }

    pub fn parameter_store(&self) -> SsmParameterStore {
        SsmParameterStore {
            client: self.ssm.clone(),
        }
    }

    pub fn zone_directory(&self) -> Route53ZoneDirectory {
        Route53ZoneDirectory {
            client: self.route53.clone(),
        }
    }
}

fn block_on_provider<T>(future: impl Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

pub struct Ec2NetworkInventory {
    client: aws_sdk_ec2::Client,
}

impl NetworkInventory for Ec2NetworkInventory {
    fn vpcs_tagged_name(&self, name: &str) -> Result<Vec<VpcRecord>, ReconcileError> {
        let client = self.client.clone();
        let filter = Filter::builder().name("tag:Name").values(name).build();

        block_on_provider(async move {
            let output = client
                .describe_vpcs()
                .filters(filter)
                .send()
                .await
                .map_err(|error| {
                    ReconcileError::provider_api(format!(
                        "failed to describe vpcs: {}",
                        aws_sdk_ec2::error::DisplayErrorContext(&error)
                    ))
                })?;

            Ok(output
                .vpcs()
                .iter()
                .map(|vpc| VpcRecord {
                    vpc_id: vpc.vpc_id().map(str::to_string),
                    ipv6_cidr_associations: vpc
                        .ipv6_cidr_block_association_set()
                        .iter()
                        .map(|association| Ipv6CidrAssociation {
                            ipv6_cidr_block: association.ipv6_cidr_block().map(str::to_string),
                            state: association
                                .ipv6_cidr_block_state()
                                .and_then(|state| state.state())
                                .map(|code| code.as_str().to_string()),
                        })
                        .collect(),
                })
                .collect())
        })
    }

    fn instance(&self, instance_id: &str) -> Result<Option<InstanceRecord>, ReconcileError> {
        let client = self.client.clone();
        let instance_id = instance_id.to_string();

        block_on_provider(async move {
            let output = match client
                .describe_instances()
                .instance_ids(instance_id.clone())
                .send()
                .await
            {
                Ok(output) => output,
                Err(error) => {
                    if error.as_service_error().and_then(|service| service.code())
                        == Some(INSTANCE_NOT_FOUND_CODE)
                    {
                        return Ok(None);
                    }
                    return Err(ReconcileError::provider_api(format!(
                        "failed to describe instance {instance_id}: {}",
                        aws_sdk_ec2::error::DisplayErrorContext(&error)
                    )));
                }
            };

            let instance = output
                .reservations()
                .iter()
                .flat_map(|reservation| reservation.instances())
                .next();

            Ok(instance.map(|instance| InstanceRecord {
                instance_id: instance
                    .instance_id()
                    .unwrap_or(instance_id.as_str())
                    .to_string(),
                network_interfaces: instance
                    .network_interfaces()
                    .iter()
                    .map(|interface| NetworkInterfaceRecord {
                        device_index: interface
                            .attachment()
                            .and_then(|attachment| attachment.device_index()),
                        ipv6_addresses: interface
                            .ipv6_addresses()
                            .iter()
                            .filter_map(|address| address.ipv6_address().map(str::to_string))
                            .collect(),
                    })
                    .collect(),
            }))
        })
    }
}

pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl ParameterStore for SsmParameterStore {
    fn put_parameter(&self, name: &str, value: &str) -> Result<(), ReconcileError> {
        let client = self.client.clone();
        let name = name.to_string();
        let value = value.to_string();

        block_on_provider(async move {
            client
                .put_parameter()
                .name(name.clone())
                .value(value)
                .r#type(ParameterType::String)
                .overwrite(true)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    ReconcileError::provider_api(format!(
                        "failed to put parameter {name}: {}",
                        aws_sdk_ssm::error::DisplayErrorContext(&error)
                    ))
                })
        })
    }

    fn delete_parameter(&self, name: &str) -> Result<DeleteOutcome, ReconcileError> {
        let client = self.client.clone();
        let name = name.to_string();

        block_on_provider(async move {
            match client.delete_parameter().name(name.clone()).send().await {
                Ok(_) => Ok(DeleteOutcome::Deleted),
                Err(error)
                    if error
                        .as_service_error()
                        .map(|service| service.is_parameter_not_found())
                        .unwrap_or(false) =>
                {
                    Ok(DeleteOutcome::AlreadyAbsent)
                }
                Err(error) => Err(ReconcileError::provider_api(format!(
                    "failed to delete parameter {name}: {}",
                    aws_sdk_ssm::error::DisplayErrorContext(&error)
                ))),
            }
        })
    }
}

pub struct Route53ZoneDirectory {
    client: aws_sdk_route53::Client,
}

impl ZoneDirectory for Route53ZoneDirectory {
    fn hosted_zone_name(&self, zone_id: &str) -> Result<Option<String>, ReconcileError> {
        let client = self.client.clone();
        let zone_id = zone_id.to_string();

        block_on_provider(async move {
            match client.get_hosted_zone().id(zone_id.clone()).send().await {
                Ok(output) => Ok(output.hosted_zone().map(|zone| zone.name().to_string())),
                Err(error)
                    if error
                        .as_service_error()
                        .map(|service| service.is_no_such_hosted_zone())
                        .unwrap_or(false) =>
                {
                    Ok(None)
                }
                Err(error) => Err(ReconcileError::provider_api(format!(
                    "failed to get hosted zone {zone_id}: {}",
                    aws_sdk_route53::error::DisplayErrorContext(&error)
                ))),
            }
        })
    }
}
