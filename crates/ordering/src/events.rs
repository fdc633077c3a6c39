use async_trait::async_trait;
use fabric_tx_types::{ConfirmationEvent, NodeDescriptor, TransactionId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, RwLock};
use tracing::warn;

use crate::OrderingError;

/// Buffer size of a confirmation event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Commit notifications from event-source peers
#[async_trait]
pub trait EventSubscription: Send + Sync {
    /// Start listening for `tx_id` on every node in `sources`.
    ///
    /// The channel closes once no source can deliver further events.
    async fn subscribe(
        &self,
        tx_id: &TransactionId,
        sources: &[NodeDescriptor],
    ) -> Result<mpsc::Receiver<ConfirmationEvent>, OrderingError>;
}

struct Subscriber {
    sources: HashSet<String>,
    sender: mpsc::Sender<ConfirmationEvent>,
}

/// In-process event router for testing
#[derive(Default)]
pub struct MockEventHub {
    subscribers: RwLock<HashMap<TransactionId, Vec<Subscriber>>>,
    failing: AtomicBool,
}

impl MockEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `subscribe` fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Deliver `event` to subscribers of its transaction that listen to its node.
    ///
    /// Returns the number of subscribers reached.
    pub async fn emit(&self, event: ConfirmationEvent) -> usize {
        let subscribers = self.subscribers.read().await;
        let Some(targets) = subscribers.get(&event.tx_id) else {
            return 0;
        };

        let mut delivered = 0;
        for subscriber in targets.iter().filter(|s| s.sources.contains(&event.node)) {
            match subscriber.sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(tx_id = %event.tx_id, node = %event.node, error = %e, "Dropped confirmation event"),
            }
        }
        delivered
    }

    /// Drop every sender for `tx_id`, closing the subscribers' streams
    pub async fn close(&self, tx_id: &TransactionId) {
        self.subscribers.write().await.remove(tx_id);
    }

    pub async fn subscriber_count(&self, tx_id: &TransactionId) -> usize {
        self.subscribers
            .read()
            .await
            .get(tx_id)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl EventSubscription for MockEventHub {
    async fn subscribe(
        &self,
        tx_id: &TransactionId,
        sources: &[NodeDescriptor],
    ) -> Result<mpsc::Receiver<ConfirmationEvent>, OrderingError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(OrderingError::Subscription(
                "event service unavailable".to_string(),
            ));
        }

        let (sender, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        self.subscribers
            .write()
            .await
            .entry(tx_id.clone())
            .or_default()
            .push(Subscriber {
                sources: sources.iter().map(|n| n.name.clone()).collect(),
                sender,
            });

        Ok(receiver)
    }
}
