use async_trait::async_trait;
use fabric_tx_types::{NodeDescriptor, NodeResponse, ProposalStatus, TransactionRequest};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::TransportError;

/// What a peer sent back for a proposal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalReply {
    /// Chaincode response code, 200..400 is success
    pub status: u32,
    pub message: String,
    pub payload: Vec<u8>,
}

impl ProposalReply {
    pub fn ok(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            message: String::new(),
            payload: payload.into(),
        }
    }

    pub fn error(status: u32, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    pub fn into_response(self, node: &str) -> NodeResponse {
        NodeResponse {
            node: node.to_string(),
            status: ProposalStatus::from_code(self.status),
            payload: self.payload,
            message: self.message,
        }
    }
}

/// Point-to-point channel to an endorsing peer
#[async_trait]
pub trait NodeTransport: Send + Sync {
    async fn send_proposal(
        &self,
        node: &NodeDescriptor,
        request: &TransactionRequest,
    ) -> Result<ProposalReply, TransportError>;
}

#[derive(Debug, Clone)]
enum MockBehavior {
    Reply(ProposalReply),
    Delayed(Duration, ProposalReply),
    Fail(String),
    Hang,
}

/// Scripted peers for testing. Unscripted peers answer `200 OK`.
#[derive(Default)]
pub struct MockNodeTransport {
    behaviors: RwLock<HashMap<String, MockBehavior>>,
    calls: AtomicUsize,
}

impl MockNodeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_reply(&self, node: impl Into<String>, reply: ProposalReply) {
        self.behaviors
            .write()
            .await
            .insert(node.into(), MockBehavior::Reply(reply));
    }

    /// Answer with `reply` after `delay`
    pub async fn set_delayed(&self, node: impl Into<String>, delay: Duration, reply: ProposalReply) {
        self.behaviors
            .write()
            .await
            .insert(node.into(), MockBehavior::Delayed(delay, reply));
    }

    /// Fail the connection to `node`
    pub async fn set_unreachable(&self, node: impl Into<String>, reason: impl Into<String>) {
        self.behaviors
            .write()
            .await
            .insert(node.into(), MockBehavior::Fail(reason.into()));
    }

    /// Never answer
    pub async fn set_hanging(&self, node: impl Into<String>) {
        self.behaviors
            .write()
            .await
            .insert(node.into(), MockBehavior::Hang);
    }

    /// Number of proposals received across all peers
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeTransport for MockNodeTransport {
    async fn send_proposal(
        &self,
        node: &NodeDescriptor,
        _request: &TransactionRequest,
    ) -> Result<ProposalReply, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let behavior = self.behaviors.read().await.get(&node.name).cloned();
        match behavior {
            None => Ok(ProposalReply::ok("OK")),
            Some(MockBehavior::Reply(reply)) => Ok(reply),
            Some(MockBehavior::Delayed(delay, reply)) => {
                tokio::time::sleep(delay).await;
                Ok(reply)
            }
            Some(MockBehavior::Fail(reason)) => Err(TransportError::Connection {
                node: node.name.clone(),
                reason,
            }),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                Err(TransportError::Closed {
                    node: node.name.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_status_mapping() {
        let ok = ProposalReply::ok("42").into_response("peer0");
        assert_eq!(ok.status, ProposalStatus::Success);
        assert_eq!(ok.payload_str(), "42");

        let conflict = ProposalReply::error(500, "MVCC_CONFLICT").into_response("peer1");
        assert_eq!(conflict.status, ProposalStatus::Failure);
        assert_eq!(conflict.message, "MVCC_CONFLICT");
        assert_eq!(conflict.node, "peer1");
    }
}
