use fabric_tx_types::{TransactionId, TxValidationCode};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderingError {
    /// A commit was attempted without a single endorsement
    #[error("refusing to submit transaction without endorsements")]
    EmptyEndorsement,

    #[error("no orderer configured")]
    NoOrderers,

    #[error("{available} event sources available, {required} confirmations required")]
    InsufficientEventSources { available: usize, required: usize },

    #[error("event subscription failed: {0}")]
    Subscription(String),

    #[error("orderer {orderer} failed: {reason}")]
    Orderer { orderer: String, reason: String },

    #[error("no orderer accepted transaction {tx_id}: {reasons}")]
    AllOrderersFailed { tx_id: TransactionId, reasons: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfirmationError {
    /// Outcome unknown: the transaction may still be committed
    #[error("timed out waiting for {tx_id}: {received}/{required} confirmations")]
    Timeout {
        tx_id: TransactionId,
        received: usize,
        required: usize,
    },

    #[error("transaction {tx_id} rejected by {node}: {code}")]
    Rejected {
        tx_id: TransactionId,
        node: String,
        code: TxValidationCode,
    },

    /// Outcome unknown: every event source went away
    #[error("event stream for {tx_id} closed after {received}/{required} confirmations")]
    StreamClosed {
        tx_id: TransactionId,
        received: usize,
        required: usize,
    },
}

impl ConfirmationError {
    /// The transaction may or may not have been sequenced
    pub fn is_ambiguous(&self) -> bool {
        !matches!(self, ConfirmationError::Rejected { .. })
    }
}
