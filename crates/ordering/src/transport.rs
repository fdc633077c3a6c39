use async_trait::async_trait;
use fabric_tx_types::{ConfirmationEvent, OrdererEndpoint, TransactionId, TxValidationCode};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::{CommitEnvelope, MockEventHub, OrdererAck, OrderingError};

/// Connection to the ordering service
#[async_trait]
pub trait OrderingTransport: Send + Sync {
    async fn broadcast(
        &self,
        orderer: &OrdererEndpoint,
        envelope: &CommitEnvelope,
    ) -> Result<OrdererAck, OrderingError>;
}

#[derive(Debug, Clone)]
enum OrdererBehavior {
    Fail(String),
    Status(u32, String),
    Hang,
}

/// Blocks the mock "cuts" after an orderer accepts an envelope
struct AutoCommit {
    hub: Arc<MockEventHub>,
    committers: Vec<String>,
    code: TxValidationCode,
    delay: Duration,
}

/// Scripted ordering service for testing.
///
/// Orderers accept everything unless scripted otherwise. With
/// [`auto_commit`](Self::auto_commit) set, every accepted transaction is
/// reported committed through a [`MockEventHub`].
#[derive(Default)]
pub struct MockOrderer {
    behaviors: RwLock<HashMap<String, OrdererBehavior>>,
    received: RwLock<Vec<(String, TransactionId)>>,
    committed: RwLock<HashSet<TransactionId>>,
    auto_commit: RwLock<Option<AutoCommit>>,
    next_block: AtomicU64,
}

impl MockOrderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_unavailable(&self, orderer: impl Into<String>, reason: impl Into<String>) {
        self.behaviors
            .write()
            .await
            .insert(orderer.into(), OrdererBehavior::Fail(reason.into()));
    }

    /// Answer with a non-success broadcast status
    pub async fn set_status(&self, orderer: impl Into<String>, status: u32, info: impl Into<String>) {
        self.behaviors
            .write()
            .await
            .insert(orderer.into(), OrdererBehavior::Status(status, info.into()));
    }

    pub async fn set_hanging(&self, orderer: impl Into<String>) {
        self.behaviors
            .write()
            .await
            .insert(orderer.into(), OrdererBehavior::Hang);
    }

    /// Emit a commit event from each of `committers` once a transaction is accepted
    pub async fn auto_commit(
        &self,
        hub: Arc<MockEventHub>,
        committers: Vec<String>,
        code: TxValidationCode,
        delay: Duration,
    ) {
        *self.auto_commit.write().await = Some(AutoCommit {
            hub,
            committers,
            code,
            delay,
        });
    }

    /// Envelopes received so far as `(orderer, tx_id)`
    pub async fn received(&self) -> Vec<(String, TransactionId)> {
        self.received.read().await.clone()
    }

    pub async fn broadcast_count(&self) -> usize {
        self.received.read().await.len()
    }

    async fn commit(&self, tx_id: &TransactionId) {
        let auto_commit = self.auto_commit.read().await;
        let Some(auto_commit) = auto_commit.as_ref() else {
            return;
        };
        if !self.committed.write().await.insert(tx_id.clone()) {
            return;
        }

        let block = self.next_block.fetch_add(1, Ordering::SeqCst) + 1;
        let events: Vec<_> = auto_commit
            .committers
            .iter()
            .map(|node| ConfirmationEvent::valid(tx_id.clone(), node.clone(), block).with_code(auto_commit.code))
            .collect();
        let hub = auto_commit.hub.clone();
        let delay = auto_commit.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            for event in events {
                hub.emit(event).await;
            }
        });
    }
}

#[async_trait]
impl OrderingTransport for MockOrderer {
    async fn broadcast(
        &self,
        orderer: &OrdererEndpoint,
        envelope: &CommitEnvelope,
    ) -> Result<OrdererAck, OrderingError> {
        self.received
            .write()
            .await
            .push((orderer.name.clone(), envelope.tx_id().clone()));

        let behavior = self.behaviors.read().await.get(&orderer.name).cloned();
        match behavior {
            None => {
                self.commit(envelope.tx_id()).await;
                Ok(OrdererAck::success(&orderer.name))
            }
            Some(OrdererBehavior::Status(status, info)) => Ok(OrdererAck {
                orderer: orderer.name.clone(),
                status,
                info,
            }),
            Some(OrdererBehavior::Fail(reason)) => Err(OrderingError::Orderer {
                orderer: orderer.name.clone(),
                reason,
            }),
            Some(OrdererBehavior::Hang) => {
                std::future::pending::<()>().await;
                Err(OrderingError::Orderer {
                    orderer: orderer.name.clone(),
                    reason: "connection closed".to_string(),
                })
            }
        }
    }
}
