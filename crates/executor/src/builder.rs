use fabric_tx_config::ExecutorConfig;
use fabric_tx_discovery::{
    DiscoveryCache, DiscoveryOptions, DiscoveryService, PeerSetResolver, StaticTopology,
    TopologyProvider,
};
use fabric_tx_endorsement::{NodeTransport, ProposalBroadcaster};
use fabric_tx_ordering::{CommitSubmitter, EventSubscription, OrderingTransport};
use fabric_tx_types::{ChaincodeReference, OrdererEndpoint};
use std::sync::Arc;
use std::time::Duration;

use crate::{ExecutionError, ExecutionSettings, Executor};

/// Assembles an [`Executor`] from its collaborators
#[derive(Default)]
pub struct ExecutorBuilder {
    chaincode: Option<ChaincodeReference>,
    topology: Option<Arc<dyn TopologyProvider>>,
    discovery: Option<Arc<dyn DiscoveryService>>,
    cache: Option<Arc<DiscoveryCache>>,
    discovery_options: DiscoveryOptions,
    node_transport: Option<Arc<dyn NodeTransport>>,
    ordering_transport: Option<Arc<dyn OrderingTransport>>,
    events: Option<Arc<dyn EventSubscription>>,
    orderers: Vec<OrdererEndpoint>,
    settings: ExecutionSettings,
}

impl ExecutorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chaincode, static peers, orderers and timing taken from `config`.
    ///
    /// Transports still have to be supplied.
    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self {
            chaincode: Some(config.chaincode_reference()),
            topology: Some(Arc::new(StaticTopology::new(config.nodes()))),
            cache: Some(Arc::new(DiscoveryCache::new(
                config.discovery.refresh_interval(),
            ))),
            discovery_options: DiscoveryOptions {
                enabled: config.discovery.enabled,
                force_refresh: config.discovery.force_refresh,
                selection: config.discovery.selection,
            },
            orderers: config.orderers.clone(),
            settings: ExecutionSettings {
                wait_time: config.execution.wait_time(),
                required_confirmations: config.execution.required_confirmations,
                creator: config.execution.creator.as_bytes().to_vec(),
            },
            ..Self::default()
        }
    }

    pub fn chaincode(mut self, chaincode: ChaincodeReference) -> Self {
        self.chaincode = Some(chaincode);
        self
    }

    pub fn topology(mut self, topology: Arc<dyn TopologyProvider>) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn discovery(mut self, discovery: Arc<dyn DiscoveryService>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Share a layout cache between executors
    pub fn discovery_cache(mut self, cache: Arc<DiscoveryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn discovery_options(mut self, options: DiscoveryOptions) -> Self {
        self.discovery_options = options;
        self
    }

    pub fn node_transport(mut self, transport: Arc<dyn NodeTransport>) -> Self {
        self.node_transport = Some(transport);
        self
    }

    pub fn ordering_transport(mut self, transport: Arc<dyn OrderingTransport>) -> Self {
        self.ordering_transport = Some(transport);
        self
    }

    pub fn event_subscription(mut self, events: Arc<dyn EventSubscription>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn orderers(mut self, orderers: Vec<OrdererEndpoint>) -> Self {
        self.orderers = orderers;
        self
    }

    pub fn wait_time(mut self, wait_time: Duration) -> Self {
        self.settings.wait_time = wait_time;
        self
    }

    pub fn required_confirmations(mut self, required: usize) -> Self {
        self.settings.required_confirmations = required;
        self
    }

    pub fn creator(mut self, creator: impl Into<Vec<u8>>) -> Self {
        self.settings.creator = creator.into();
        self
    }

    pub fn build(self) -> Result<Executor, ExecutionError> {
        let chaincode = required(self.chaincode, "chaincode")?;
        let topology = required(self.topology, "topology")?;
        let node_transport = required(self.node_transport, "node transport")?;
        let ordering_transport = required(self.ordering_transport, "ordering transport")?;
        let events = required(self.events, "event subscription")?;

        if self.settings.wait_time.is_zero() {
            return Err(ExecutionError::InvalidConfiguration {
                reason: "wait time must be greater than zero".to_string(),
            });
        }

        let mut resolver = PeerSetResolver::new(topology).with_options(self.discovery_options);
        if let Some(discovery) = self.discovery {
            let cache = self.cache.unwrap_or_default();
            resolver = resolver.with_discovery(discovery, cache);
        }

        Ok(Executor::new(
            chaincode,
            resolver,
            ProposalBroadcaster::new(node_transport),
            CommitSubmitter::new(ordering_transport, events, self.orderers),
            self.settings,
        ))
    }
}

fn required<T>(value: Option<T>, what: &str) -> Result<T, ExecutionError> {
    value.ok_or_else(|| ExecutionError::InvalidConfiguration {
        reason: format!("missing {what}"),
    })
}
