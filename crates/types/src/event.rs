use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TransactionId;

/// Validation verdict a committing peer attaches to a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxValidationCode {
    Valid,
    DuplicateTxid,
    BadPayload,
    EndorsementPolicyFailure,
    MvccReadConflict,
    PhantomReadConflict,
    InvalidOtherReason,
}

impl TxValidationCode {
    pub fn is_valid(self) -> bool {
        matches!(self, TxValidationCode::Valid)
    }
}

impl fmt::Display for TxValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TxValidationCode::Valid => "VALID",
            TxValidationCode::DuplicateTxid => "DUPLICATE_TXID",
            TxValidationCode::BadPayload => "BAD_PAYLOAD",
            TxValidationCode::EndorsementPolicyFailure => "ENDORSEMENT_POLICY_FAILURE",
            TxValidationCode::MvccReadConflict => "MVCC_READ_CONFLICT",
            TxValidationCode::PhantomReadConflict => "PHANTOM_READ_CONFLICT",
            TxValidationCode::InvalidOtherReason => "INVALID_OTHER_REASON",
        };
        f.write_str(s)
    }
}

/// Notification from a committing peer that a transaction landed in a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationEvent {
    pub tx_id: TransactionId,
    /// Peer that observed the commit
    pub node: String,
    pub block_number: u64,
    pub validation_code: TxValidationCode,
}

impl ConfirmationEvent {
    pub fn valid(tx_id: TransactionId, node: impl Into<String>, block_number: u64) -> Self {
        Self {
            tx_id,
            node: node.into(),
            block_number,
            validation_code: TxValidationCode::Valid,
        }
    }

    pub fn with_code(mut self, code: TxValidationCode) -> Self {
        self.validation_code = code;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.validation_code.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_code_serde() {
        let json = serde_json::to_string(&TxValidationCode::MvccReadConflict).unwrap();
        assert_eq!(json, "\"MVCC_READ_CONFLICT\"");
        assert_eq!(TxValidationCode::MvccReadConflict.to_string(), "MVCC_READ_CONFLICT");
    }

    #[test]
    fn test_event_validity() {
        let event = ConfirmationEvent::valid(TransactionId::from("tx1"), "peer0", 7);
        assert!(event.is_valid());

        let rejected = event.with_code(TxValidationCode::EndorsementPolicyFailure);
        assert!(!rejected.is_valid());
    }
}
