use fabric_tx_discovery::TopologyError;
use fabric_tx_ordering::{ConfirmationError, OrderingError};
use fabric_tx_types::{RequestError, TransactionId};
use std::fmt;
use thiserror::Error;

/// Phase of an execution, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionStage {
    Preparing,
    Resolving,
    Broadcasting,
    Classifying,
    Submitting,
    Confirming,
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStage::Preparing => "preparing",
            ExecutionStage::Resolving => "resolving",
            ExecutionStage::Broadcasting => "broadcasting",
            ExecutionStage::Classifying => "classifying",
            ExecutionStage::Submitting => "submitting",
            ExecutionStage::Confirming => "confirming",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("no endorsement for transaction {tx_id}: {rejected} peers rejected or unreachable")]
    InsufficientEndorsement { tx_id: TransactionId, rejected: usize },

    #[error("commit failed: {0}")]
    Commit(#[from] OrderingError),

    #[error("confirmation failed: {0}")]
    Confirmation(#[from] ConfirmationError),

    #[error("deadline exceeded for transaction {tx_id} while {stage}")]
    DeadlineExceeded {
        tx_id: TransactionId,
        stage: ExecutionStage,
    },

    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

impl ExecutionError {
    /// Phase that produced the error
    pub fn stage(&self) -> ExecutionStage {
        match self {
            ExecutionError::InvalidRequest(_) | ExecutionError::InvalidConfiguration { .. } => {
                ExecutionStage::Preparing
            }
            ExecutionError::Topology(_) => ExecutionStage::Resolving,
            ExecutionError::InsufficientEndorsement { .. } => ExecutionStage::Classifying,
            ExecutionError::Commit(_) => ExecutionStage::Submitting,
            ExecutionError::Confirmation(_) => ExecutionStage::Confirming,
            ExecutionError::DeadlineExceeded { stage, .. } => *stage,
        }
    }

    /// True when the transaction may have been ordered despite the error
    pub fn is_ambiguous(&self) -> bool {
        match self {
            ExecutionError::Confirmation(e) => e.is_ambiguous(),
            ExecutionError::DeadlineExceeded { stage, .. } => {
                matches!(stage, ExecutionStage::Submitting | ExecutionStage::Confirming)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_tx_types::TxValidationCode;

    #[test]
    fn test_stage_mapping() {
        let tx_id = TransactionId::from("tx-1");

        assert_eq!(
            ExecutionError::from(RequestError::EmptyFunction).stage(),
            ExecutionStage::Preparing
        );
        assert_eq!(
            ExecutionError::from(OrderingError::NoOrderers).stage(),
            ExecutionStage::Submitting
        );
        assert_eq!(
            ExecutionError::InsufficientEndorsement {
                tx_id: tx_id.clone(),
                rejected: 3
            }
            .stage(),
            ExecutionStage::Classifying
        );
        assert_eq!(
            ExecutionError::DeadlineExceeded {
                tx_id,
                stage: ExecutionStage::Submitting
            }
            .stage(),
            ExecutionStage::Submitting
        );
    }

    #[test]
    fn test_ambiguity() {
        let tx_id = TransactionId::from("tx-1");

        let timeout = ExecutionError::from(ConfirmationError::Timeout {
            tx_id: tx_id.clone(),
            received: 0,
            required: 1,
        });
        assert!(timeout.is_ambiguous());

        let rejected = ExecutionError::from(ConfirmationError::Rejected {
            tx_id: tx_id.clone(),
            node: "peer0".to_string(),
            code: TxValidationCode::MvccReadConflict,
        });
        assert!(!rejected.is_ambiguous());

        let insufficient = ExecutionError::InsufficientEndorsement { tx_id, rejected: 3 };
        assert!(!insufficient.is_ambiguous());
    }
}
