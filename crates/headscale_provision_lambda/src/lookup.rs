//! Read-only discovery of attributes the provider assigns after creation.

use headscale_provision_core::error::ReconcileError;
use tracing::warn;

use crate::adapters::inventory::{Ipv6CidrAssociation, NetworkInventory};
use crate::adapters::zone_directory::ZoneDirectory;

/// Association states whose block no longer belongs to the VPC.
const RELEASED_ASSOCIATION_STATES: [&str; 3] = ["disassociating", "disassociated", "failed"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcDiscovery {
    pub vpc_id: String,
    pub ipv6_cidr_block: String,
}

pub fn find_vpc_by_tag(
    inventory: &dyn NetworkInventory,
    stack_name: &str,
) -> Result<VpcDiscovery, ReconcileError> {
    let vpcs = inventory.vpcs_tagged_name(stack_name)?;
    let Some(vpc) = vpcs.first() else {
        return Err(ReconcileError::not_found(format!(
            "No VPC found with the name {stack_name}"
        )));
    };
    if vpcs.len() > 1 {
        warn!(
            component = "resource_lookup",
            event = "ambiguous_vpc_tag",
            stack_name,
            matches = vpcs.len(),
            "multiple VPCs share the Name tag, using the first"
        );
    }

    let vpc_id = vpc.vpc_id.clone().ok_or_else(|| {
        ReconcileError::attribute_not_ready(format!(
            "VPC tagged {stack_name} has no VPC id yet"
        ))
    })?;

    let ipv6_cidr_block = vpc
        .ipv6_cidr_associations
        .iter()
        .filter(|association| !is_released(association))
        .find_map(|association| association.ipv6_cidr_block.clone())
        .ok_or_else(|| {
            ReconcileError::attribute_not_ready(format!(
                "VPC {vpc_id} has no IPv6 CIDR block association yet"
            ))
        })?;

    Ok(VpcDiscovery {
        vpc_id,
        ipv6_cidr_block,
    })
}

fn is_released(association: &Ipv6CidrAssociation) -> bool {
    association
        .state
        .as_deref()
        .map(|state| RELEASED_ASSOCIATION_STATES.contains(&state))
        .unwrap_or(false)
}

/// First IPv6 address on the instance's primary network interface.
pub fn find_instance_address(
    inventory: &dyn NetworkInventory,
    instance_id: &str,
) -> Result<String, ReconcileError> {
    let instance = inventory.instance(instance_id)?.ok_or_else(|| {
        ReconcileError::not_found(format!("No instance found with id {instance_id}"))
    })?;

    let primary = instance
        .network_interfaces
        .iter()
        .min_by_key(|interface| interface.device_index.unwrap_or(i32::MAX))
        .ok_or_else(|| {
            ReconcileError::attribute_not_ready(format!(
                "Instance {instance_id} has no network interface yet"
            ))
        })?;

    primary.ipv6_addresses.first().cloned().ok_or_else(|| {
        ReconcileError::attribute_not_ready(format!(
            "No IPv6 address found for instance {instance_id}"
        ))
    })
}

/// Zone name exactly as the provider returns it (fully qualified).
pub fn find_zone_domain(
    zones: &dyn ZoneDirectory,
    zone_id: &str,
) -> Result<String, ReconcileError> {
    zones
        .hosted_zone_name(zone_id)?
        .ok_or_else(|| ReconcileError::not_found(format!("No hosted zone found with id {zone_id}")))
}
