use headscale_provision_core::config_paths::ConfigAttribute;
use headscale_provision_core::contract::{
    ResourceProperties, ResponseData, DOMAIN_NAME_ATTRIBUTE, HOSTED_ZONE_ID_PROPERTY,
};
use headscale_provision_core::error::ReconcileError;
use headscale_provision_core::provisioning_graph::ReconcilerKind;

use crate::adapters::parameter_store::ParameterStore;
use crate::adapters::zone_directory::ZoneDirectory;
use crate::config_store::{delete_attributes, write_attribute};
use crate::domain::resolve_domain;
use crate::handlers::{Applied, Reconciler};

pub struct ZoneDomainReconciler<'a> {
    pub zones: &'a dyn ZoneDirectory,
    pub store: &'a dyn ParameterStore,
    pub default_stack_name: &'a str,
}

impl Reconciler for ZoneDomainReconciler<'_> {
    fn kind(&self) -> ReconcilerKind {
        ReconcilerKind::ZoneDomain
    }

    fn apply(&self, properties: &ResourceProperties) -> Result<Applied, ReconcileError> {
        let stack_name = properties.stack_name_or(self.default_stack_name)?;
        let zone_id = properties.require_str(HOSTED_ZONE_ID_PROPERTY)?;
        let domain_name = resolve_domain(self.zones, zone_id)?;

        // Stack-scoped, so a HostedZoneId change stays an in-place update.
        let path = write_attribute(
            self.store,
            stack_name,
            ConfigAttribute::DomainName,
            &domain_name,
        )?;

        Ok(Applied {
            physical_resource_id: path,
            data: ResponseData::from([(DOMAIN_NAME_ATTRIBUTE.to_string(), domain_name)]),
        })
    }

    fn remove(&self, properties: &ResourceProperties) -> Result<(), ReconcileError> {
        let stack_name = properties.stack_name_or(self.default_stack_name)?;
        delete_attributes(self.store, stack_name, &[ConfigAttribute::DomainName])
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helpers::{RecordingStore, StaticZones};

    use super::*;

    #[test]
    fn writes_normalized_domain() {
        let zones = StaticZones::with_zone("Z123", "example.com.");
        let store = RecordingStore::new();
        let applied = ZoneDomainReconciler {
            zones: &zones,
            store: &store,
            default_stack_name: "headscale",
        }
        .apply(&ResourceProperties::from_pairs([("HostedZoneId", "Z123")]))
        .expect("apply should succeed");

        assert_eq!(applied.physical_resource_id, "/config/headscale/domainName");
        assert_eq!(
            store.values().get("/config/headscale/domainName").map(String::as_str),
            Some("example.com")
        );
    }

    #[test]
    fn changing_zone_keeps_physical_id() {
        let zones = StaticZones::with_zone("Z1", "old.example.com.")
            .and_zone("Z2", "new.example.com.");
        let store = RecordingStore::new();
        let reconciler = ZoneDomainReconciler {
            zones: &zones,
            store: &store,
            default_stack_name: "headscale",
        };

        let created = reconciler
            .apply(&ResourceProperties::from_pairs([("HostedZoneId", "Z1")]))
            .expect("create should succeed");
        let updated = reconciler
            .apply(&ResourceProperties::from_pairs([("HostedZoneId", "Z2")]))
            .expect("update should succeed");

        assert_eq!(created.physical_resource_id, updated.physical_resource_id);
        assert_eq!(
            store.values().get("/config/headscale/domainName").map(String::as_str),
            Some("new.example.com")
        );
    }

    #[test]
    fn remove_leaves_cidr_entry_alone() {
        let zones = StaticZones::default();
        let store = RecordingStore::new();
        store.seed("/config/headscale/domainName", "example.com");
        store.seed("/config/headscale/ipv6CidrBlock", "2600:1::/56");

        ZoneDomainReconciler {
            zones: &zones,
            store: &store,
            default_stack_name: "headscale",
        }
        .remove(&ResourceProperties::default())
        .expect("remove should succeed");

        assert_eq!(
            store.values().keys().cloned().collect::<Vec<_>>(),
            vec!["/config/headscale/ipv6CidrBlock".to_string()]
        );
    }
}
