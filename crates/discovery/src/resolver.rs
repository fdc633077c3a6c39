use fabric_tx_types::{
    nodes_with_role, ChaincodeReference, EndorsementSelection, NodeDescriptor, NodeRole,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    select_peers, CachedLayouts, DiscoveryCache, DiscoveryService, TopologyError,
    TopologyProvider,
};

/// How the resolver uses service discovery
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryOptions {
    /// Use discovery whenever a discovery-capable node is present
    pub enabled: bool,
    /// Ignore cached layouts and reload the topology on every resolution
    pub force_refresh: bool,
    pub selection: EndorsementSelection,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            force_refresh: false,
            selection: EndorsementSelection::Random,
        }
    }
}

/// Nodes chosen for one invocation, taken from a single topology snapshot
#[derive(Debug, Clone)]
pub struct ResolvedPeers {
    pub endorsers: Vec<NodeDescriptor>,
    pub event_sources: Vec<NodeDescriptor>,
}

/// Determines which nodes a proposal goes to
pub struct PeerSetResolver {
    topology: Arc<dyn TopologyProvider>,
    discovery: Option<Arc<dyn DiscoveryService>>,
    cache: Arc<DiscoveryCache>,
    options: DiscoveryOptions,
}

impl PeerSetResolver {
    /// Resolver limited to the statically configured endorsers
    pub fn new(topology: Arc<dyn TopologyProvider>) -> Self {
        Self {
            topology,
            discovery: None,
            cache: Arc::new(DiscoveryCache::default()),
            options: DiscoveryOptions::default(),
        }
    }

    pub fn with_discovery(
        mut self,
        discovery: Arc<dyn DiscoveryService>,
        cache: Arc<DiscoveryCache>,
    ) -> Self {
        self.discovery = Some(discovery);
        self.cache = cache;
        self
    }

    pub fn with_options(mut self, options: DiscoveryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn cache(&self) -> &Arc<DiscoveryCache> {
        &self.cache
    }

    /// Endorsing nodes for `chaincode`, in the order proposals should go out
    pub async fn resolve(
        &self,
        chaincode: &ChaincodeReference,
    ) -> Result<Vec<NodeDescriptor>, TopologyError> {
        Ok(self.resolve_peers(chaincode).await?.endorsers)
    }

    /// Endorsers plus the event sources a commit is confirmed through.
    ///
    /// The topology is read once, so nothing after this call depends on the
    /// provider answering again.
    pub async fn resolve_peers(
        &self,
        chaincode: &ChaincodeReference,
    ) -> Result<ResolvedPeers, TopologyError> {
        self.resolve_with(chaincode, self.options.force_refresh)
            .await
    }

    /// Like [`resolve`](Self::resolve) but bypassing every cache
    pub async fn refresh(
        &self,
        chaincode: &ChaincodeReference,
    ) -> Result<Vec<NodeDescriptor>, TopologyError> {
        Ok(self.resolve_with(chaincode, true).await?.endorsers)
    }

    async fn resolve_with(
        &self,
        chaincode: &ChaincodeReference,
        force_refresh: bool,
    ) -> Result<ResolvedPeers, TopologyError> {
        let nodes = self.topology.nodes(force_refresh).await?;
        let event_sources = nodes_with_role(&nodes, NodeRole::EventSource);
        let discovery_nodes = nodes_with_role(&nodes, NodeRole::ServiceDiscovery);

        let selected = match &self.discovery {
            Some(discovery) if self.options.enabled && !discovery_nodes.is_empty() => {
                let snapshot = self
                    .layouts(discovery.as_ref(), &discovery_nodes, chaincode, force_refresh)
                    .await?;
                let picked = select_peers(
                    &snapshot.layouts,
                    self.options.selection,
                    &mut rand::thread_rng(),
                );
                picked.ok_or_else(|| TopologyError::NoSatisfiableLayout {
                    chaincode: chaincode.to_string(),
                })?
            }
            _ => nodes_with_role(&nodes, NodeRole::EndorsingPeer),
        };

        if selected.is_empty() {
            return Err(TopologyError::NoEligibleNodes {
                chaincode: chaincode.to_string(),
            });
        }

        debug!(
            chaincode = %chaincode,
            peers = ?selected.iter().map(|n| n.name.as_str()).collect::<Vec<_>>(),
            event_sources = event_sources.len(),
            "Resolved endorsing peers"
        );

        Ok(ResolvedPeers {
            endorsers: selected,
            event_sources,
        })
    }

    async fn layouts(
        &self,
        discovery: &dyn DiscoveryService,
        via: &[NodeDescriptor],
        chaincode: &ChaincodeReference,
        force_refresh: bool,
    ) -> Result<Arc<CachedLayouts>, TopologyError> {
        let key = chaincode.cache_key();

        if !force_refresh {
            if let Some(cached) = self.cache.get(&key).await {
                return Ok(cached);
            }
        }

        let mut last_error = None;
        for node in via {
            match discovery.endorsement_layouts(node, chaincode).await {
                Ok(layouts) => {
                    info!(
                        chaincode = %chaincode,
                        node = %node.name,
                        layouts = layouts.len(),
                        "Refreshed endorsement layouts"
                    );
                    return Ok(self.cache.store(&key, layouts).await);
                }
                Err(e) => {
                    warn!(chaincode = %chaincode, node = %node.name, error = %e, "Discovery query failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| TopologyError::NoEligibleNodes {
            chaincode: chaincode.to_string(),
        }))
    }
}
