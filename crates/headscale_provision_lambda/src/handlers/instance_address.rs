use headscale_provision_core::contract::{
    ResourceProperties, ResponseData, INSTANCE_ID_PROPERTY, IPV6_ADDRESS_ATTRIBUTE,
};
use headscale_provision_core::error::ReconcileError;
use headscale_provision_core::provisioning_graph::ReconcilerKind;

use crate::adapters::inventory::NetworkInventory;
use crate::handlers::{Applied, Reconciler};
use crate::lookup::find_instance_address;

/// Reports a running instance's IPv6 address for the DNS record. Nothing is
/// persisted, so Delete only acknowledges.
pub struct InstanceAddressReconciler<'a> {
    pub inventory: &'a dyn NetworkInventory,
}

impl Reconciler for InstanceAddressReconciler<'_> {
    fn kind(&self) -> ReconcilerKind {
        ReconcilerKind::InstanceAddress
    }

    fn apply(&self, properties: &ResourceProperties) -> Result<Applied, ReconcileError> {
        let instance_id = properties.require_str(INSTANCE_ID_PROPERTY)?;
        let address = find_instance_address(self.inventory, instance_id)?;

        Ok(Applied {
            physical_resource_id: instance_id.to_string(),
            data: ResponseData::from([(IPV6_ADDRESS_ATTRIBUTE.to_string(), address)]),
        })
    }

    fn remove(&self, _properties: &ResourceProperties) -> Result<(), ReconcileError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helpers::StaticInventory;

    use super::*;

    #[test]
    fn reports_instance_address() {
        let inventory = StaticInventory::with_instance("i-0abc", &["2600:1f18:abcd:1::5"]);
        let applied = InstanceAddressReconciler {
            inventory: &inventory,
        }
        .apply(&ResourceProperties::from_pairs([("InstanceId", "i-0abc")]))
        .expect("apply should succeed");

        assert_eq!(applied.physical_resource_id, "i-0abc");
        assert_eq!(
            applied.data.get("Ipv6Address").map(String::as_str),
            Some("2600:1f18:abcd:1::5")
        );
    }

    #[test]
    fn requires_instance_id() {
        let inventory = StaticInventory::default();
        let error = InstanceAddressReconciler {
            inventory: &inventory,
        }
        .apply(&ResourceProperties::default())
        .expect_err("InstanceId is required");

        assert_eq!(error, ReconcileError::MissingProperty("InstanceId".to_string()));
    }
}
