use headscale_provision_core::error::ReconcileError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ipv6CidrAssociation {
    pub ipv6_cidr_block: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VpcRecord {
    pub vpc_id: Option<String>,
    pub ipv6_cidr_associations: Vec<Ipv6CidrAssociation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkInterfaceRecord {
    pub device_index: Option<i32>,
    pub ipv6_addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstanceRecord {
    pub instance_id: String,
    pub network_interfaces: Vec<NetworkInterfaceRecord>,
}

/// Read-only view of the provider's network inventory.
pub trait NetworkInventory {
    fn vpcs_tagged_name(&self, name: &str) -> Result<Vec<VpcRecord>, ReconcileError>;

    /// `None` when no instance with `instance_id` exists.
    fn instance(&self, instance_id: &str) -> Result<Option<InstanceRecord>, ReconcileError>;
}
