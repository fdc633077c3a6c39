use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Capability a peer advertises in the network topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Evaluates proposals and returns an endorsement
    EndorsingPeer,
    ChaincodeQuery,
    LedgerQuery,
    /// Emits block / transaction events
    EventSource,
    /// Answers endorsement layout queries
    ServiceDiscovery,
}

impl NodeRole {
    pub const ALL: [NodeRole; 5] = [
        NodeRole::EndorsingPeer,
        NodeRole::ChaincodeQuery,
        NodeRole::LedgerQuery,
        NodeRole::EventSource,
        NodeRole::ServiceDiscovery,
    ];
}

/// A peer in the topology, tagged with the roles it serves
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub msp_id: String,
    pub roles: BTreeSet<NodeRole>,
}

impl NodeDescriptor {
    /// New peer serving every role, which is what an untagged peer does
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            msp_id: String::new(),
            roles: NodeRole::ALL.into_iter().collect(),
        }
    }

    pub fn with_msp(mut self, msp_id: impl Into<String>) -> Self {
        self.msp_id = msp_id.into();
        self
    }

    /// Replace the role set
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = NodeRole>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    pub fn has_role(&self, role: NodeRole) -> bool {
        self.roles.contains(&role)
    }
}

impl fmt::Display for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

/// Keep only the nodes that carry `role`, preserving order
pub fn nodes_with_role(nodes: &[NodeDescriptor], role: NodeRole) -> Vec<NodeDescriptor> {
    nodes.iter().filter(|n| n.has_role(role)).cloned().collect()
}

/// How a peer set is picked among the endorsement layouts discovery returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndorsementSelection {
    /// Random layout, random peers within each group
    #[default]
    Random,
    /// Layout needing the fewest peers, ties broken at random
    FewestPeers,
}

/// An ordering service endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrdererEndpoint {
    pub name: String,
    pub url: String,
}

impl OrdererEndpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_serves_all_roles() {
        let node = NodeDescriptor::new("peer0", "grpc://peer0:7051");
        for role in NodeRole::ALL {
            assert!(node.has_role(role));
        }
    }

    #[test]
    fn test_role_filter_preserves_order() {
        let nodes = vec![
            NodeDescriptor::new("peer0", "grpc://peer0:7051")
                .with_roles([NodeRole::EndorsingPeer]),
            NodeDescriptor::new("peer1", "grpc://peer1:7051").with_roles([NodeRole::EventSource]),
            NodeDescriptor::new("peer2", "grpc://peer2:7051")
                .with_roles([NodeRole::EndorsingPeer, NodeRole::EventSource]),
        ];

        let endorsers = nodes_with_role(&nodes, NodeRole::EndorsingPeer);
        let names: Vec<_> = endorsers.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["peer0", "peer2"]);

        assert!(nodes_with_role(&nodes, NodeRole::ServiceDiscovery).is_empty());
    }

    #[test]
    fn test_roles_deserialize_snake_case() {
        let json = r#"{"name":"peer0","url":"grpc://peer0:7051","roles":["endorsing_peer","service_discovery"]}"#;
        let node: NodeDescriptor = serde_json::from_str(json).unwrap();
        assert!(node.has_role(NodeRole::ServiceDiscovery));
        assert!(!node.has_role(NodeRole::EventSource));
        assert!(node.msp_id.is_empty());
    }
}
