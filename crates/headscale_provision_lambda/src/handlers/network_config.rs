//! Discovers the VPC's auto-assigned IPv6 block (and optionally the hosted
//! zone's domain) and publishes both under the stack's configuration paths.

use headscale_provision_core::config_paths::ConfigAttribute;
use headscale_provision_core::contract::{
    ResourceProperties, ResponseData, DOMAIN_NAME_ATTRIBUTE, HOSTED_ZONE_ID_PROPERTY,
    IPV6_CIDR_BLOCK_ATTRIBUTE,
};
use headscale_provision_core::error::ReconcileError;
use headscale_provision_core::provisioning_graph::ReconcilerKind;

use crate::adapters::inventory::NetworkInventory;
use crate::adapters::parameter_store::ParameterStore;
use crate::adapters::zone_directory::ZoneDirectory;
use crate::config_store::{delete_attributes, write_attribute};
use crate::domain::resolve_domain;
use crate::handlers::{Applied, Reconciler};
use crate::lookup::find_vpc_by_tag;

pub struct NetworkConfigReconciler<'a> {
    pub inventory: &'a dyn NetworkInventory,
    pub zones: &'a dyn ZoneDirectory,
    pub store: &'a dyn ParameterStore,
    pub default_stack_name: &'a str,
}

impl Reconciler for NetworkConfigReconciler<'_> {
    fn kind(&self) -> ReconcilerKind {
        ReconcilerKind::NetworkConfig
    }

    fn apply(&self, properties: &ResourceProperties) -> Result<Applied, ReconcileError> {
        let stack_name = properties.stack_name_or(self.default_stack_name)?;

        // Resolve everything before the first write so a bad zone id leaves
        // no half-written configuration behind.
        let vpc = find_vpc_by_tag(self.inventory, stack_name)?;
        let domain_name = properties
            .get_str(HOSTED_ZONE_ID_PROPERTY)
            .map(|zone_id| resolve_domain(self.zones, zone_id))
            .transpose()?;

        write_attribute(
            self.store,
            stack_name,
            ConfigAttribute::Ipv6CidrBlock,
            &vpc.ipv6_cidr_block,
        )?;
        let mut data = ResponseData::from([(
            IPV6_CIDR_BLOCK_ATTRIBUTE.to_string(),
            vpc.ipv6_cidr_block,
        )]);

        if let Some(domain_name) = domain_name {
            write_attribute(self.store, stack_name, ConfigAttribute::DomainName, &domain_name)?;
            data.insert(DOMAIN_NAME_ATTRIBUTE.to_string(), domain_name);
        }

        Ok(Applied {
            physical_resource_id: vpc.vpc_id,
            data,
        })
    }

    fn remove(&self, properties: &ResourceProperties) -> Result<(), ReconcileError> {
        let stack_name = properties.stack_name_or(self.default_stack_name)?;
        delete_attributes(self.store, stack_name, &ConfigAttribute::ALL)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helpers::{RecordingStore, StaticInventory, StaticZones};

    use super::*;

    fn reconciler<'a>(
        inventory: &'a StaticInventory,
        zones: &'a StaticZones,
        store: &'a RecordingStore,
    ) -> NetworkConfigReconciler<'a> {
        NetworkConfigReconciler {
            inventory,
            zones,
            store,
            default_stack_name: "headscale",
        }
    }

    #[test]
    fn writes_cidr_block_under_default_stack() {
        let inventory = StaticInventory::with_vpc("headscale", "vpc-0abc", &["2600:1f18:abcd::/56"]);
        let zones = StaticZones::default();
        let store = RecordingStore::new();

        let applied = reconciler(&inventory, &zones, &store)
            .apply(&ResourceProperties::default())
            .expect("apply should succeed");

        assert_eq!(applied.physical_resource_id, "vpc-0abc");
        assert_eq!(
            applied.data,
            ResponseData::from([(
                "Ipv6CidrBlock".to_string(),
                "2600:1f18:abcd::/56".to_string()
            )])
        );
        assert_eq!(
            store.values().get("/config/headscale/ipv6CidrBlock").map(String::as_str),
            Some("2600:1f18:abcd::/56")
        );
    }

    #[test]
    fn resolves_domain_when_zone_is_supplied() {
        let inventory = StaticInventory::with_vpc("edge", "vpc-1", &["2600:1::/56"]);
        let zones = StaticZones::with_zone("Z123", "example.com.");
        let store = RecordingStore::new();
        let properties =
            ResourceProperties::from_pairs([("StackName", "edge"), ("HostedZoneId", "Z123")]);

        let applied = reconciler(&inventory, &zones, &store)
            .apply(&properties)
            .expect("apply should succeed");

        assert_eq!(
            applied.data.get("DomainName").map(String::as_str),
            Some("example.com")
        );
        assert_eq!(
            store.values().get("/config/edge/domainName").map(String::as_str),
            Some("example.com")
        );
    }

    #[test]
    fn unknown_zone_writes_nothing() {
        let inventory = StaticInventory::with_vpc("headscale", "vpc-1", &["2600:1::/56"]);
        let zones = StaticZones::default();
        let store = RecordingStore::new();
        let properties = ResourceProperties::from_pairs([("HostedZoneId", "Z404")]);

        let error = reconciler(&inventory, &zones, &store)
            .apply(&properties)
            .expect_err("zone is unknown");

        assert!(matches!(error, ReconcileError::NotFound(_)));
        assert_eq!(store.put_count(), 0);
    }

    #[test]
    fn remove_clears_both_entries_and_tolerates_absence() {
        let inventory = StaticInventory::default();
        let zones = StaticZones::default();
        let store = RecordingStore::new();
        store.seed("/config/headscale/ipv6CidrBlock", "2600:1::/56");

        let reconciler = reconciler(&inventory, &zones, &store);
        reconciler
            .remove(&ResourceProperties::default())
            .expect("first delete succeeds");
        reconciler
            .remove(&ResourceProperties::default())
            .expect("second delete succeeds");

        assert!(store.values().is_empty());
    }
}
