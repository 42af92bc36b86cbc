//! Dependency graph for the single-node deployment.
//!
//! Each reconciliation step is a node with an inbound edge from the resource
//! it queries and outbound attribute bindings to the resources that consume
//! its discovered value. The orchestrator creates nodes in topological order,
//! so a reconciler never runs before its prerequisite has finished.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::contract::{DOMAIN_NAME_ATTRIBUTE, IPV6_ADDRESS_ATTRIBUTE, IPV6_CIDR_BLOCK_ATTRIBUTE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconcilerKind {
    NetworkConfig,
    InstanceAddress,
    ZoneDomain,
}

impl ReconcilerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NetworkConfig => "network-config",
            Self::InstanceAddress => "instance-address",
            Self::ZoneDomain => "zone-domain",
        }
    }

    /// Attributes the reconciler returns in its response data.
    pub fn produced_attributes(self) -> &'static [&'static str] {
        match self {
            Self::NetworkConfig => &[IPV6_CIDR_BLOCK_ATTRIBUTE, DOMAIN_NAME_ATTRIBUTE],
            Self::InstanceAddress => &[IPV6_ADDRESS_ATTRIBUTE],
            Self::ZoneDomain => &[DOMAIN_NAME_ATTRIBUTE],
        }
    }
}

impl fmt::Display for ReconcilerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReconcilerKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "network-config" => Ok(Self::NetworkConfig),
            "instance-address" => Ok(Self::InstanceAddress),
            "zone-domain" => Ok(Self::ZoneDomain),
            other => Err(format!(
                "unknown reconciler '{other}', expected one of: network-config, instance-address, zone-domain"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Resource,
    Reconciliation(ReconcilerKind),
}

/// A value one node reads from another node's outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBinding {
    pub source: String,
    pub attribute: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningNode {
    pub logical_id: String,
    pub kind: NodeKind,
    pub waits_on: Vec<String>,
    pub consumes: Vec<AttributeBinding>,
}

impl ProvisioningNode {
    pub fn resource(logical_id: &str) -> Self {
        Self {
            logical_id: logical_id.to_string(),
            kind: NodeKind::Resource,
            waits_on: Vec::new(),
            consumes: Vec::new(),
        }
    }

    pub fn reconciliation(logical_id: &str, reconciler: ReconcilerKind) -> Self {
        Self {
            kind: NodeKind::Reconciliation(reconciler),
            ..Self::resource(logical_id)
        }
    }

    pub fn waits_on(mut self, logical_ids: &[&str]) -> Self {
        self.waits_on
            .extend(logical_ids.iter().map(|id| id.to_string()));
        self
    }

    pub fn consumes(mut self, source: &str, attribute: &str) -> Self {
        self.consumes.push(AttributeBinding {
            source: source.to_string(),
            attribute: attribute.to_string(),
        });
        self
    }

    /// Explicit waits plus the producers of every consumed attribute.
    pub fn prerequisites(&self) -> BTreeSet<&str> {
        self.waits_on
            .iter()
            .map(String::as_str)
            .chain(self.consumes.iter().map(|binding| binding.source.as_str()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("duplicate logical id: {0}")]
    DuplicateNode(String),
    #[error("{node} depends on unknown node {missing}")]
    UnknownDependency { node: String, missing: String },
    #[error("{node} consumes {attribute} which {source_node} does not produce")]
    UnproducedAttribute {
        node: String,
        source_node: String,
        attribute: String,
    },
    #[error("dependency cycle among: {0:?}")]
    Cycle(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct ProvisioningGraph {
    nodes: Vec<ProvisioningNode>,
}

impl ProvisioningGraph {
    pub fn new(nodes: Vec<ProvisioningNode>) -> Result<Self, GraphError> {
        let mut index: BTreeMap<&str, &ProvisioningNode> = BTreeMap::new();
        for node in &nodes {
            if index.insert(node.logical_id.as_str(), node).is_some() {
                return Err(GraphError::DuplicateNode(node.logical_id.clone()));
            }
        }

        for node in &nodes {
            for prerequisite in node.prerequisites() {
                if !index.contains_key(prerequisite) {
                    return Err(GraphError::UnknownDependency {
                        node: node.logical_id.clone(),
                        missing: prerequisite.to_string(),
                    });
                }
            }
            for binding in &node.consumes {
                // Plain resources expose arbitrary attributes; reconcilers only
                // expose what they report.
                if let NodeKind::Reconciliation(kind) = index[binding.source.as_str()].kind {
                    if !kind.produced_attributes().contains(&binding.attribute.as_str()) {
                        return Err(GraphError::UnproducedAttribute {
                            node: node.logical_id.clone(),
                            source_node: binding.source.clone(),
                            attribute: binding.attribute.clone(),
                        });
                    }
                }
            }
        }

        let graph = Self { nodes };
        graph.creation_order()?;
        Ok(graph)
    }

    pub fn nodes(&self) -> &[ProvisioningNode] {
        &self.nodes
    }

    pub fn node(&self, logical_id: &str) -> Option<&ProvisioningNode> {
        self.nodes.iter().find(|node| node.logical_id == logical_id)
    }

    /// Topological order; ties resolve to declaration order so the result is
    /// stable for identical input.
    pub fn creation_order(&self) -> Result<Vec<&str>, GraphError> {
        let mut remaining: Vec<(&str, BTreeSet<&str>)> = self
            .nodes
            .iter()
            .map(|node| (node.logical_id.as_str(), node.prerequisites()))
            .collect();
        let mut created: BTreeSet<&str> = BTreeSet::new();
        let mut order = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let ready = remaining
                .iter()
                .position(|(_, prerequisites)| prerequisites.is_subset(&created));
            let Some(position) = ready else {
                return Err(GraphError::Cycle(
                    remaining.iter().map(|(id, _)| id.to_string()).collect(),
                ));
            };
            let (logical_id, _) = remaining.remove(position);
            created.insert(logical_id);
            order.push(logical_id);
        }

        Ok(order)
    }

    /// Reverse of the creation order: consumers go before their producers.
    pub fn deletion_order(&self) -> Result<Vec<&str>, GraphError> {
        let mut order = self.creation_order()?;
        order.reverse();
        Ok(order)
    }

    pub fn reconciliation_nodes(&self) -> impl Iterator<Item = (&ProvisioningNode, ReconcilerKind)> {
        self.nodes.iter().filter_map(|node| match node.kind {
            NodeKind::Reconciliation(kind) => Some((node, kind)),
            NodeKind::Resource => None,
        })
    }
}

/// The deployment this workspace provisions: a dual-stack VPC, one public
/// subnet, one coordination-server instance, and its DNS record.
pub fn headscale_stack_graph() -> Result<ProvisioningGraph, GraphError> {
    ProvisioningGraph::new(vec![
        ProvisioningNode::resource("LambdaExecutionRole"),
        ProvisioningNode::resource("NetworkConfigFunction").waits_on(&["LambdaExecutionRole"]),
        ProvisioningNode::resource("InstanceAddressFunction").waits_on(&["LambdaExecutionRole"]),
        ProvisioningNode::resource("HeadscaleVpc"),
        ProvisioningNode::resource("HeadscaleIpv6CidrBlock").waits_on(&["HeadscaleVpc"]),
        ProvisioningNode::reconciliation("NetworkConfigResource", ReconcilerKind::NetworkConfig)
            .waits_on(&["NetworkConfigFunction", "HeadscaleIpv6CidrBlock"]),
        ProvisioningNode::resource("HeadscaleInternetGateway"),
        ProvisioningNode::resource("HeadscaleVpcGatewayAttachment")
            .waits_on(&["HeadscaleVpc", "HeadscaleInternetGateway"]),
        ProvisioningNode::resource("HeadscaleRouteTable").waits_on(&["HeadscaleVpc"]),
        ProvisioningNode::resource("Route")
            .waits_on(&["HeadscaleRouteTable", "HeadscaleVpcGatewayAttachment"]),
        ProvisioningNode::resource("Ipv6Route")
            .waits_on(&["HeadscaleRouteTable", "HeadscaleVpcGatewayAttachment"]),
        ProvisioningNode::resource("HeadscalePublicSubnet")
            .waits_on(&["HeadscaleVpc"])
            .consumes("NetworkConfigResource", IPV6_CIDR_BLOCK_ATTRIBUTE),
        ProvisioningNode::resource("HeadscaleSubnetRouteTableAssociation")
            .waits_on(&["HeadscalePublicSubnet", "HeadscaleRouteTable"]),
        ProvisioningNode::resource("HeadscaleSecurityGroup").waits_on(&["HeadscaleVpc"]),
        ProvisioningNode::resource("EC2Keypair"),
        ProvisioningNode::resource("EC2Instance").waits_on(&[
            "HeadscalePublicSubnet",
            "HeadscaleSecurityGroup",
            "EC2Keypair",
        ]),
        ProvisioningNode::reconciliation("InstanceAddressResource", ReconcilerKind::InstanceAddress)
            .waits_on(&["InstanceAddressFunction", "EC2Instance"]),
        ProvisioningNode::resource("HeadscaleDnsRecord")
            .consumes("NetworkConfigResource", DOMAIN_NAME_ATTRIBUTE)
            .consumes("InstanceAddressResource", IPV6_ADDRESS_ATTRIBUTE),
    ])
}
