use async_trait::async_trait;
use fabric_tx_types::{ChaincodeReference, NodeDescriptor};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::TopologyError;

/// Peers of one organisation, of which `required` must endorse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndorsementGroup {
    pub name: String,
    pub required: usize,
    pub peers: Vec<NodeDescriptor>,
}

impl EndorsementGroup {
    pub fn new(name: impl Into<String>, required: usize, peers: Vec<NodeDescriptor>) -> Self {
        Self {
            name: name.into(),
            required,
            peers,
        }
    }
}

/// One combination of groups that satisfies the endorsement policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndorsementLayout {
    pub groups: Vec<EndorsementGroup>,
}

impl EndorsementLayout {
    pub fn new(groups: Vec<EndorsementGroup>) -> Self {
        Self { groups }
    }

    /// Total number of endorsements this layout asks for
    pub fn required_peers(&self) -> usize {
        self.groups.iter().map(|g| g.required).sum()
    }

    /// Every group has enough peers to meet its quantity
    pub fn is_satisfiable(&self) -> bool {
        !self.groups.is_empty() && self.groups.iter().all(|g| g.peers.len() >= g.required)
    }
}

/// Peer that can answer endorsement layout queries
#[async_trait]
pub trait DiscoveryService: Send + Sync {
    /// Layouts satisfying `chaincode`'s policy, as seen by `via`
    async fn endorsement_layouts(
        &self,
        via: &NodeDescriptor,
        chaincode: &ChaincodeReference,
    ) -> Result<Vec<EndorsementLayout>, TopologyError>;
}

/// Scripted discovery service for testing
#[derive(Default)]
pub struct MockDiscovery {
    layouts: RwLock<HashMap<String, Vec<EndorsementLayout>>>,
    failing: RwLock<HashSet<String>>,
    queries: AtomicUsize,
}

impl MockDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_layouts(&self, chaincode: &ChaincodeReference, layouts: Vec<EndorsementLayout>) {
        self.layouts
            .write()
            .await
            .insert(chaincode.cache_key(), layouts);
    }

    /// Make queries through `node` fail
    pub async fn fail_via(&self, node: impl Into<String>) {
        self.failing.write().await.insert(node.into());
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscoveryService for MockDiscovery {
    async fn endorsement_layouts(
        &self,
        via: &NodeDescriptor,
        chaincode: &ChaincodeReference,
    ) -> Result<Vec<EndorsementLayout>, TopologyError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if self.failing.read().await.contains(&via.name) {
            return Err(TopologyError::Discovery {
                node: via.name.clone(),
                reason: "connection refused".to_string(),
            });
        }

        Ok(self
            .layouts
            .read()
            .await
            .get(&chaincode.cache_key())
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peers(names: &[&str]) -> Vec<NodeDescriptor> {
        names
            .iter()
            .map(|n| NodeDescriptor::new(*n, format!("grpc://{n}:7051")))
            .collect()
    }

    #[test]
    fn test_layout_requirements() {
        let layout = EndorsementLayout::new(vec![
            EndorsementGroup::new("Org1", 1, peers(&["p0", "p1"])),
            EndorsementGroup::new("Org2", 2, peers(&["p2", "p3"])),
        ]);
        assert_eq!(layout.required_peers(), 3);
        assert!(layout.is_satisfiable());
    }

    #[test]
    fn test_layout_with_short_group_is_unsatisfiable() {
        let layout = EndorsementLayout::new(vec![EndorsementGroup::new("Org1", 2, peers(&["p0"]))]);
        assert!(!layout.is_satisfiable());
        assert!(!EndorsementLayout::new(vec![]).is_satisfiable());
    }
}
