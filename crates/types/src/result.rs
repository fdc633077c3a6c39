use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ConfirmationEvent, NodeResponse, TransactionId};

/// Responses partitioned into endorsed and rejected.
///
/// Every response lands in exactly one of the two sequences, in the order it
/// was received.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifiedResponses {
    pub accepted: Vec<Arc<NodeResponse>>,
    pub rejected: Vec<Arc<NodeResponse>>,
}

impl ClassifiedResponses {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    pub fn has_endorsement(&self) -> bool {
        !self.accepted.is_empty()
    }
}

/// Outcome of one `execute` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub tx_id: TransactionId,
    pub accepted: Vec<Arc<NodeResponse>>,
    pub rejected: Vec<Arc<NodeResponse>>,
    /// Set only for state-changing invocations that were committed
    pub committed_event: Option<ConfirmationEvent>,
}

impl ExecutionResult {
    pub fn from_classified(
        tx_id: TransactionId,
        classified: ClassifiedResponses,
        committed_event: Option<ConfirmationEvent>,
    ) -> Self {
        Self {
            tx_id,
            accepted: classified.accepted,
            rejected: classified.rejected,
            committed_event,
        }
    }

    /// Payload of the first endorsing peer, if any
    pub fn payload(&self) -> Option<&[u8]> {
        self.accepted.first().map(|r| r.payload.as_slice())
    }

    pub fn block_number(&self) -> Option<u64> {
        self.committed_event.as_ref().map(|e| e.block_number)
    }
}
