use async_trait::async_trait;
use fabric_tx_types::NodeDescriptor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::TopologyError;

/// Source of the node list for a channel
#[async_trait]
pub trait TopologyProvider: Send + Sync {
    /// Current nodes; `force_refresh` asks the provider to reload first
    async fn nodes(&self, force_refresh: bool) -> Result<Vec<NodeDescriptor>, TopologyError>;
}

/// Fixed node list, usually built from configuration
#[derive(Debug, Clone)]
pub struct StaticTopology {
    nodes: Arc<Vec<NodeDescriptor>>,
}

impl StaticTopology {
    pub fn new(nodes: Vec<NodeDescriptor>) -> Self {
        Self {
            nodes: Arc::new(nodes),
        }
    }
}

#[async_trait]
impl TopologyProvider for StaticTopology {
    async fn nodes(&self, _force_refresh: bool) -> Result<Vec<NodeDescriptor>, TopologyError> {
        Ok(self.nodes.as_ref().clone())
    }
}

/// Mutable topology for testing
pub struct MockTopology {
    nodes: RwLock<Vec<NodeDescriptor>>,
    refreshes: AtomicUsize,
}

impl MockTopology {
    pub fn new(nodes: Vec<NodeDescriptor>) -> Self {
        Self {
            nodes: RwLock::new(nodes),
            refreshes: AtomicUsize::new(0),
        }
    }

    pub async fn set_nodes(&self, nodes: Vec<NodeDescriptor>) {
        *self.nodes.write().await = nodes;
    }

    /// Number of forced refreshes requested so far
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TopologyProvider for MockTopology {
    async fn nodes(&self, force_refresh: bool) -> Result<Vec<NodeDescriptor>, TopologyError> {
        if force_refresh {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(self.nodes.read().await.clone())
    }
}
