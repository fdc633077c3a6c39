use fabric_tx_types::{
    ConfirmationEvent, NodeDescriptor, NodeResponse, OrdererEndpoint, TransactionId,
    TransactionRequest,
};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::{CommitEnvelope, EventSubscription, OrderingError, OrderingTransport};

/// Per-commit settings
#[derive(Debug, Clone)]
pub struct CommitOptions {
    /// Peers whose commit events count as confirmations
    pub event_sources: Vec<NodeDescriptor>,
    /// Distinct confirmations to wait for; zero is read as one
    pub required_confirmations: usize,
    /// Orderers that have not acknowledged by then count as failed
    pub deadline: Instant,
}

impl CommitOptions {
    pub fn new(event_sources: Vec<NodeDescriptor>, deadline: Instant) -> Self {
        Self {
            event_sources,
            required_confirmations: 1,
            deadline,
        }
    }

    pub fn with_required_confirmations(mut self, required: usize) -> Self {
        self.required_confirmations = required;
        self
    }

    pub fn required(&self) -> usize {
        self.required_confirmations.max(1)
    }
}

/// A transaction accepted by the ordering service but not yet confirmed
#[derive(Debug)]
pub struct PendingCommit {
    pub tx_id: TransactionId,
    /// Orderers that acknowledged the envelope
    pub acknowledged_by: Vec<String>,
    /// Commit events for `tx_id`, subscribed before the envelope went out
    pub events: mpsc::Receiver<ConfirmationEvent>,
}

/// Hands endorsed transactions to every configured orderer
pub struct CommitSubmitter {
    transport: Arc<dyn OrderingTransport>,
    subscription: Arc<dyn EventSubscription>,
    orderers: Vec<OrdererEndpoint>,
}

impl CommitSubmitter {
    pub fn new(
        transport: Arc<dyn OrderingTransport>,
        subscription: Arc<dyn EventSubscription>,
        orderers: Vec<OrdererEndpoint>,
    ) -> Self {
        Self {
            transport,
            subscription,
            orderers,
        }
    }

    pub fn orderers(&self) -> &[OrdererEndpoint] {
        &self.orderers
    }

    /// Submit `accepted` for ordering.
    ///
    /// Succeeds as soon as one orderer acknowledges; the rest are logged.
    pub async fn submit(
        &self,
        request: &TransactionRequest,
        accepted: &[Arc<NodeResponse>],
        options: &CommitOptions,
    ) -> Result<PendingCommit, OrderingError> {
        let envelope = CommitEnvelope::new(request, accepted.to_vec())?;

        if self.orderers.is_empty() {
            return Err(OrderingError::NoOrderers);
        }

        let required = options.required();
        if options.event_sources.len() < required {
            return Err(OrderingError::InsufficientEventSources {
                available: options.event_sources.len(),
                required,
            });
        }

        // Subscribe first so a fast commit cannot slip past us
        let events = self
            .subscription
            .subscribe(envelope.tx_id(), &options.event_sources)
            .await?;

        debug!(
            tx_id = %envelope.tx_id(),
            endorsers = ?envelope.endorsers(),
            orderers = self.orderers.len(),
            "Submitting transaction for ordering"
        );

        let sends = self.orderers.iter().map(|orderer| {
            let envelope = &envelope;
            async move {
                let result = match timeout_at(options.deadline, self.transport.broadcast(orderer, envelope)).await {
                    Ok(Ok(ack)) if ack.is_success() => Ok(ack),
                    Ok(Ok(ack)) => Err(format!("status {} {}", ack.status, ack.info)),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err("no acknowledgement before deadline".to_string()),
                };
                (orderer, result)
            }
        });

        let mut acknowledged_by = Vec::new();
        let mut reasons = Vec::new();
        for (orderer, result) in join_all(sends).await {
            match result {
                Ok(_) => acknowledged_by.push(orderer.name.clone()),
                Err(reason) => {
                    warn!(
                        tx_id = %envelope.tx_id(),
                        orderer = %orderer.name,
                        reason = %reason,
                        "Orderer did not accept transaction"
                    );
                    reasons.push(format!("{}: {}", orderer.name, reason));
                }
            }
        }

        if acknowledged_by.is_empty() {
            return Err(OrderingError::AllOrderersFailed {
                tx_id: envelope.tx_id().clone(),
                reasons: reasons.join("; "),
            });
        }

        info!(
            tx_id = %envelope.tx_id(),
            acknowledged_by = ?acknowledged_by,
            "Transaction accepted for ordering"
        );

        Ok(PendingCommit {
            tx_id: envelope.tx_id().clone(),
            acknowledged_by,
            events,
        })
    }
}
