use fabric_tx_types::{ChaincodeReference, NodeResponse, TransactionId, TransactionRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::OrderingError;

/// Endorsed proposal, ready for ordering. Never empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitEnvelope {
    tx_id: TransactionId,
    chaincode: Arc<ChaincodeReference>,
    function: String,
    args: Vec<String>,
    endorsements: Vec<Arc<NodeResponse>>,
}

impl CommitEnvelope {
    pub fn new(
        request: &TransactionRequest,
        endorsements: Vec<Arc<NodeResponse>>,
    ) -> Result<Self, OrderingError> {
        if endorsements.is_empty() {
            return Err(OrderingError::EmptyEndorsement);
        }

        Ok(Self {
            tx_id: request.tx_id.clone(),
            chaincode: request.chaincode.clone(),
            function: request.function.clone(),
            args: request.args.clone(),
            endorsements,
        })
    }

    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    pub fn chaincode(&self) -> &ChaincodeReference {
        &self.chaincode
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn endorsements(&self) -> &[Arc<NodeResponse>] {
        &self.endorsements
    }

    /// Names of the endorsing peers, in endorsement order
    pub fn endorsers(&self) -> Vec<&str> {
        self.endorsements.iter().map(|e| e.node.as_str()).collect()
    }
}

/// Orderer's answer to a broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdererAck {
    pub orderer: String,
    pub status: u32,
    #[serde(default)]
    pub info: String,
}

impl OrdererAck {
    pub fn success(orderer: impl Into<String>) -> Self {
        Self {
            orderer: orderer.into(),
            status: 200,
            info: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}
