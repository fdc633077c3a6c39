use fabric_tx_types::{NodeDescriptor, NodeResponse, ProposalStatus, TransactionRequest};
use futures::future::join_all;
use std::sync::Arc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::NodeTransport;

/// Fans a proposal out to a set of peers and collects every answer
pub struct ProposalBroadcaster {
    transport: Arc<dyn NodeTransport>,
}

impl ProposalBroadcaster {
    pub fn new(transport: Arc<dyn NodeTransport>) -> Self {
        Self { transport }
    }

    /// One response per node, in node order, bounded by `request.max_wait`
    pub async fn broadcast(
        &self,
        request: &TransactionRequest,
        nodes: &[NodeDescriptor],
    ) -> Vec<Arc<NodeResponse>> {
        let deadline = Instant::now() + request.max_wait;
        self.broadcast_until(request, nodes, deadline).await
    }

    /// Same as [`broadcast`](Self::broadcast) with an explicit deadline.
    ///
    /// Peers still pending at `deadline` are reported unreachable; their
    /// late answers are dropped.
    pub async fn broadcast_until(
        &self,
        request: &TransactionRequest,
        nodes: &[NodeDescriptor],
        deadline: Instant,
    ) -> Vec<Arc<NodeResponse>> {
        debug!(
            tx_id = %request.tx_id,
            function = %request.function,
            nodes = nodes.len(),
            "Broadcasting proposal"
        );

        let sends = nodes.iter().map(|node| async move {
            let response = match timeout_at(deadline, self.transport.send_proposal(node, request)).await {
                Ok(Ok(reply)) => reply.into_response(&node.name),
                Ok(Err(e)) => NodeResponse::unreachable(&node.name, e.to_string()),
                Err(_) => NodeResponse::unreachable(&node.name, "no response before deadline"),
            };
            Arc::new(response)
        });

        let responses = join_all(sends).await;

        for response in &responses {
            log_response(request, response);
        }

        responses
    }
}

fn log_response(request: &TransactionRequest, response: &NodeResponse) {
    match response.status {
        ProposalStatus::Success => info!(
            tx_id = %request.tx_id,
            node = %response.node,
            status = %response.status,
            payload = %response.payload_str(),
            "Proposal endorsed"
        ),
        _ => warn!(
            tx_id = %request.tx_id,
            node = %response.node,
            status = %response.status,
            message = %response.message,
            "Proposal not endorsed"
        ),
    }
}
