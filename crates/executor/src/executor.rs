use fabric_tx_discovery::{PeerSetResolver, ResolvedPeers};
use fabric_tx_endorsement::{ProposalBroadcaster, ResponseClassifier};
use fabric_tx_ordering::{CommitOptions, CommitSubmitter, ConfirmationWaiter};
use fabric_tx_types::{
    ChaincodeReference, ExecutionResult, TransactionKind, TransactionRequest, DEFAULT_WAIT_TIME_MS,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::{ExecutionError, ExecutionStage, ExecutorBuilder};

/// Per-executor tunables
#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    /// Bounds broadcast, submission and confirmation together
    pub wait_time: Duration,
    pub required_confirmations: usize,
    /// Identity mixed into every transaction id
    pub creator: Vec<u8>,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            wait_time: Duration::from_millis(DEFAULT_WAIT_TIME_MS),
            required_confirmations: 1,
            creator: Vec::new(),
        }
    }
}

/// Executes invocations of one chaincode.
///
/// Cheap to share behind an `Arc`; concurrent calls only share the
/// resolver's discovery cache.
pub struct Executor {
    chaincode: Arc<ChaincodeReference>,
    resolver: PeerSetResolver,
    broadcaster: ProposalBroadcaster,
    classifier: ResponseClassifier,
    submitter: CommitSubmitter,
    waiter: ConfirmationWaiter,
    settings: ExecutionSettings,
}

impl Executor {
    pub fn new(
        chaincode: ChaincodeReference,
        resolver: PeerSetResolver,
        broadcaster: ProposalBroadcaster,
        submitter: CommitSubmitter,
        settings: ExecutionSettings,
    ) -> Self {
        Self {
            chaincode: Arc::new(chaincode),
            resolver,
            broadcaster,
            classifier: ResponseClassifier::default(),
            submitter,
            waiter: ConfirmationWaiter::new(),
            settings,
        }
    }

    pub fn builder() -> ExecutorBuilder {
        ExecutorBuilder::new()
    }

    pub fn chaincode(&self) -> &ChaincodeReference {
        &self.chaincode
    }

    pub fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    /// Evaluate without ordering
    pub async fn query<I, S>(&self, function: &str, args: I) -> Result<ExecutionResult, ExecutionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.execute(TransactionKind::Query, function, args).await
    }

    /// Endorse, order and wait for the commit
    pub async fn invoke<I, S>(&self, function: &str, args: I) -> Result<ExecutionResult, ExecutionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.execute(TransactionKind::Invoke, function, args).await
    }

    /// Run one invocation through every phase `kind` calls for
    pub async fn execute<I, S>(
        &self,
        kind: TransactionKind,
        function: &str,
        args: I,
    ) -> Result<ExecutionResult, ExecutionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = TransactionRequest::new(
            self.chaincode.clone(),
            function,
            args.into_iter().map(Into::into).collect(),
            self.settings.wait_time,
            &self.settings.creator,
        )?;
        let tx_id = request.tx_id.clone();

        info!(
            tx_id = %tx_id,
            chaincode = %self.chaincode,
            function = %request.function,
            kind = ?kind,
            "Starting execution"
        );

        // 1. Resolve endorsing peers and event sources together
        info!(tx_id = %tx_id, stage = %ExecutionStage::Resolving, "Resolving endorsing peers");
        let ResolvedPeers {
            endorsers: nodes,
            event_sources,
        } = self.resolver.resolve_peers(&self.chaincode).await?;

        // 2. Broadcast the proposal; the wait time runs from here
        let deadline = Instant::now() + request.max_wait;
        info!(tx_id = %tx_id, stage = %ExecutionStage::Broadcasting, peers = nodes.len(), "Broadcasting proposal");
        let responses = self
            .broadcaster
            .broadcast_until(&request, &nodes, deadline)
            .await;

        // 3. Classify
        let classified = self.classifier.classify(&responses);
        info!(
            tx_id = %tx_id,
            stage = %ExecutionStage::Classifying,
            accepted = classified.accepted.len(),
            rejected = classified.rejected.len(),
            "Classified proposal responses"
        );

        if !kind.is_state_changing() {
            return Ok(ExecutionResult::from_classified(tx_id, classified, None));
        }

        if !classified.has_endorsement() {
            warn!(tx_id = %tx_id, rejected = classified.rejected.len(), "No peer endorsed the proposal");
            return Err(ExecutionError::InsufficientEndorsement {
                tx_id,
                rejected: classified.rejected.len(),
            });
        }

        // 4. Submit for ordering
        info!(tx_id = %tx_id, stage = %ExecutionStage::Submitting, "Submitting endorsed transaction");
        let required = self.settings.required_confirmations.max(1);
        let options = CommitOptions::new(event_sources, deadline).with_required_confirmations(required);

        let pending = timeout_at(
            deadline,
            self.submitter.submit(&request, &classified.accepted, &options),
        )
        .await
        .map_err(|_| ExecutionError::DeadlineExceeded {
            tx_id: tx_id.clone(),
            stage: ExecutionStage::Submitting,
        })??;

        // 5. Wait for commit
        info!(
            tx_id = %tx_id,
            stage = %ExecutionStage::Confirming,
            acknowledged_by = ?pending.acknowledged_by,
            required,
            "Waiting for commit confirmation"
        );
        let event = self
            .waiter
            .await_confirmation(pending, required, deadline)
            .await?;

        info!(tx_id = %tx_id, block = event.block_number, "Execution complete");

        Ok(ExecutionResult::from_classified(tx_id, classified, Some(event)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fabric_tx_discovery::{MockTopology, TopologyError, TopologyProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use fabric_tx_endorsement::{MockNodeTransport, ProposalReply};
    use fabric_tx_ordering::{ConfirmationError, MockEventHub, MockOrderer};
    use fabric_tx_types::{NodeDescriptor, NodeRole, OrdererEndpoint, ProposalStatus, TxValidationCode};

    struct Fixture {
        executor: Executor,
        peers: Arc<MockNodeTransport>,
        orderer: Arc<MockOrderer>,
        hub: Arc<MockEventHub>,
    }

    fn peer(name: &str) -> NodeDescriptor {
        NodeDescriptor::new(name, format!("grpc://{name}:7051"))
            .with_roles([NodeRole::EndorsingPeer, NodeRole::EventSource])
    }

    fn fixture(wait_time: Duration) -> Fixture {
        let peers = Arc::new(MockNodeTransport::new());
        let orderer = Arc::new(MockOrderer::new());
        let hub = Arc::new(MockEventHub::new());

        let executor = Executor::builder()
            .chaincode(ChaincodeReference::new("sacc", "1.0"))
            .topology(Arc::new(MockTopology::new(vec![
                peer("peer0"),
                peer("peer1"),
                peer("peer2"),
            ])))
            .node_transport(peers.clone())
            .ordering_transport(orderer.clone())
            .event_subscription(hub.clone())
            .orderers(vec![OrdererEndpoint::new("orderer0", "grpc://orderer0:7050")])
            .wait_time(wait_time)
            .creator("Org1MSP")
            .build()
            .unwrap();

        Fixture {
            executor,
            peers,
            orderer,
            hub,
        }
    }

    async fn commit_from(f: &Fixture, nodes: &[&str], code: TxValidationCode) {
        f.orderer
            .auto_commit(
                f.hub.clone(),
                nodes.iter().map(|n| n.to_string()).collect(),
                code,
                Duration::from_millis(10),
            )
            .await;
    }

    #[tokio::test]
    async fn test_query_skips_commit() {
        let f = fixture(Duration::from_secs(1));
        f.peers.set_reply("peer1", ProposalReply::error(500, "not found")).await;

        let result = f.executor.query("get", ["a"]).await.unwrap();

        assert_eq!(result.accepted.len(), 2);
        assert_eq!(result.rejected.len(), 1);
        assert!(result.committed_event.is_none());
        assert_eq!(f.orderer.broadcast_count().await, 0);
    }

    #[tokio::test]
    async fn test_query_without_endorsement_still_returns() {
        let f = fixture(Duration::from_secs(1));
        for name in ["peer0", "peer1", "peer2"] {
            f.peers.set_unreachable(name, "connection refused").await;
        }

        let result = f.executor.query("get", ["a"]).await.unwrap();
        assert!(result.accepted.is_empty());
        assert_eq!(result.rejected.len(), 3);
        assert_eq!(f.orderer.broadcast_count().await, 0);
    }

    #[tokio::test]
    async fn test_invoke_commits() {
        let f = fixture(Duration::from_secs(1));
        commit_from(&f, &["peer0"], TxValidationCode::Valid).await;

        let result = f.executor.invoke("set", ["a", "10"]).await.unwrap();

        assert_eq!(result.accepted.len(), 3);
        assert_eq!(result.payload(), Some(b"OK".as_slice()));
        assert_eq!(result.block_number(), Some(1));
        assert_eq!(f.orderer.broadcast_count().await, 1);
    }

    #[tokio::test]
    async fn test_invoke_requires_endorsement() {
        let f = fixture(Duration::from_secs(1));
        for name in ["peer0", "peer1", "peer2"] {
            f.peers
                .set_reply(name, ProposalReply::error(500, "MVCC_CONFLICT"))
                .await;
        }

        let err = f.executor.invoke("set", ["a", "10"]).await.unwrap_err();

        assert!(matches!(err, ExecutionError::InsufficientEndorsement { rejected: 3, .. }));
        assert_eq!(err.stage(), ExecutionStage::Classifying);
        assert_eq!(f.orderer.broadcast_count().await, 0);
    }

    #[tokio::test]
    async fn test_invoke_rejected_at_commit() {
        let f = fixture(Duration::from_secs(1));
        commit_from(&f, &["peer0"], TxValidationCode::MvccReadConflict).await;

        let err = f.executor.invoke("set", ["a", "10"]).await.unwrap_err();

        assert!(matches!(
            err,
            ExecutionError::Confirmation(ConfirmationError::Rejected { .. })
        ));
        assert!(!err.is_ambiguous());
    }

    #[tokio::test]
    async fn test_invoke_times_out_without_events() {
        let f = fixture(Duration::from_millis(150));

        let started = Instant::now();
        let err = f.executor.invoke("set", ["a", "10"]).await.unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(matches!(
            err,
            ExecutionError::Confirmation(ConfirmationError::Timeout { .. })
        ));
        assert!(err.is_ambiguous());
        assert_eq!(err.stage(), ExecutionStage::Confirming);
    }

    /// Answers the first lookup, then never answers again
    struct StallingTopology {
        nodes: Vec<NodeDescriptor>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TopologyProvider for StallingTopology {
        async fn nodes(&self, _force_refresh: bool) -> Result<Vec<NodeDescriptor>, TopologyError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(self.nodes.clone())
            } else {
                std::future::pending().await
            }
        }
    }

    #[tokio::test]
    async fn test_invoke_reads_topology_once() {
        let topology = Arc::new(StallingTopology {
            nodes: vec![peer("peer0")],
            calls: AtomicUsize::new(0),
        });
        let orderer = Arc::new(MockOrderer::new());
        let hub = Arc::new(MockEventHub::new());
        let executor = Executor::builder()
            .chaincode(ChaincodeReference::new("sacc", "1.0"))
            .topology(topology.clone())
            .node_transport(Arc::new(MockNodeTransport::new()))
            .ordering_transport(orderer.clone())
            .event_subscription(hub.clone())
            .orderers(vec![OrdererEndpoint::new("orderer0", "grpc://orderer0:7050")])
            .wait_time(Duration::from_millis(200))
            .build()
            .unwrap();

        let err = tokio::time::timeout(Duration::from_secs(3), executor.invoke("set", ["a", "10"]))
            .await
            .expect("invoke must finish within its wait time")
            .unwrap_err();

        assert!(matches!(
            err,
            ExecutionError::Confirmation(ConfirmationError::Timeout { .. })
        ));
        assert_eq!(topology.calls.load(Ordering::SeqCst), 1);
        assert_eq!(orderer.broadcast_count().await, 1);
    }

    #[tokio::test]
    async fn test_invoke_commits_with_single_topology_read() {
        let topology = Arc::new(StallingTopology {
            nodes: vec![peer("peer0"), peer("peer1")],
            calls: AtomicUsize::new(0),
        });
        let orderer = Arc::new(MockOrderer::new());
        let hub = Arc::new(MockEventHub::new());
        orderer
            .auto_commit(
                hub.clone(),
                vec!["peer1".to_string()],
                TxValidationCode::Valid,
                Duration::from_millis(10),
            )
            .await;
        let executor = Executor::builder()
            .chaincode(ChaincodeReference::new("sacc", "1.0"))
            .topology(topology.clone())
            .node_transport(Arc::new(MockNodeTransport::new()))
            .ordering_transport(orderer)
            .event_subscription(hub)
            .orderers(vec![OrdererEndpoint::new("orderer0", "grpc://orderer0:7050")])
            .wait_time(Duration::from_secs(1))
            .build()
            .unwrap();

        let result = executor.invoke("set", ["a", "10"]).await.unwrap();
        assert_eq!(result.block_number(), Some(1));
        assert_eq!(topology.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_function_rejected() {
        let f = fixture(Duration::from_secs(1));
        let err = f.executor.query("", Vec::<String>::new()).await.unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidRequest(_)));
        assert_eq!(f.peers.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_endorsers_is_topology_error() {
        let executor = Executor::builder()
            .chaincode(ChaincodeReference::new("sacc", "1.0"))
            .topology(Arc::new(MockTopology::new(vec![NodeDescriptor::new(
                "peer0",
                "grpc://peer0:7051",
            )
            .with_roles([NodeRole::EventSource])])))
            .node_transport(Arc::new(MockNodeTransport::new()))
            .ordering_transport(Arc::new(MockOrderer::new()))
            .event_subscription(Arc::new(MockEventHub::new()))
            .build()
            .unwrap();

        let err = executor.query("get", ["a"]).await.unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Topology(TopologyError::NoEligibleNodes { .. })
        ));
        assert_eq!(err.stage(), ExecutionStage::Resolving);
    }

    #[tokio::test]
    async fn test_kind_from_flag() {
        let f = fixture(Duration::from_secs(1));
        let result = f
            .executor
            .execute(TransactionKind::from(false), "get", ["a"])
            .await
            .unwrap();
        assert!(result
            .accepted
            .iter()
            .all(|r| r.status == ProposalStatus::Success));
        assert_eq!(f.orderer.broadcast_count().await, 0);
    }
}
